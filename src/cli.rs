//! Interface de linha de comando do fleetwatch baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (delete-device,
//! assign-group, notify, invoke, config) e flags globais que sobrescrevem
//! a política de retentativa (--max-attempts, --timeout-ms, --quiet).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use fleetwatch::config::FleetConfig;
use fleetwatch::functions::NotificationChannel;

/// fleetwatch — operações da frota de dispositivos com retentativa e timeout.
#[derive(Debug, Parser)]
#[command(name = "fleetwatch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./fleetwatch.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Número máximo de tentativas por operação.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Timeout de cada tentativa em milissegundos.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Desativa os logs de tentativa do executor.
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Habilita saída detalhada (nível debug).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Emite os logs em JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,
}

/// Canal de notificação aceito pela CLI, mapeado para [`NotificationChannel`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Telegram,
    Email,
}

impl From<ChannelArg> for NotificationChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Telegram => NotificationChannel::Telegram,
            ChannelArg::Email => NotificationChannel::Email,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove um dispositivo e seus dados associados.
    DeleteDevice {
        /// Identificador do dispositivo.
        device_id: String,
    },

    /// Atribui um dispositivo a um grupo (sem --group, remove do grupo atual).
    AssignGroup {
        /// Identificador do dispositivo.
        device_id: String,

        /// Identificador do grupo de destino.
        #[arg(long)]
        group: Option<String>,
    },

    /// Envia uma notificação via Telegram ou e-mail.
    Notify {
        #[arg(long, value_enum)]
        channel: ChannelArg,

        /// Destinatário (e-mail ou chat id do Telegram).
        #[arg(long)]
        to: Option<String>,

        /// Assunto (apenas e-mail).
        #[arg(long)]
        subject: Option<String>,

        /// Texto da notificação.
        message: String,
    },

    /// Chama uma função serverless arbitrária com um corpo JSON.
    Invoke {
        /// Nome da função (ex.: delete-device).
        function: String,

        /// Corpo JSON da requisição (padrão: `{}`).
        #[arg(long)]
        body: Option<String>,
    },

    /// Mostra a configuração efetiva.
    Config,
}

impl Cli {
    /// Aplica as flags globais sobre a configuração carregada.
    pub fn apply_to(&self, config: &mut FleetConfig) {
        if let Some(max_attempts) = self.max_attempts {
            config.executor.max_attempts = max_attempts;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.executor.timeout_ms = timeout_ms;
        }
        if self.quiet {
            config.executor.log_enabled = false;
        }
    }

    /// Nível de log padrão quando `RUST_LOG` não está definido.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
