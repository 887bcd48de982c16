pub mod client;
pub mod types;

pub use client::{FunctionClient, FunctionInvoker};
pub use types::{
    AssignGroupRequest, DeleteDeviceRequest, FunctionResponse, NotificationChannel,
    NotificationRequest,
};
