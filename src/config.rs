//! Configuração do fleetwatch carregada a partir de `fleetwatch.toml`.
//!
//! A struct [`FleetConfig`] agrupa a configuração do executor de retentativas
//! (`[executor]`) e do cliente das funções serverless (`[functions]`).
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `FLEETWATCH_API_KEY` e `FLEETWATCH_FUNCTIONS_URL`
//! têm precedência sobre o arquivo.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FleetError;
use crate::executor::ExecutorConfig;

/// Nome do arquivo procurado no diretório atual.
pub const CONFIG_FILE: &str = "fleetwatch.toml";

pub const API_KEY_ENV: &str = "FLEETWATCH_API_KEY";
pub const FUNCTIONS_URL_ENV: &str = "FLEETWATCH_FUNCTIONS_URL";

/// Configuração de nível superior carregada de `fleetwatch.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetConfig {
    /// Política de retentativa e timeout aplicada a cada operação.
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Endpoint e credenciais das funções serverless.
    #[serde(default)]
    pub functions: FunctionsConfig,
}

/// Parâmetros de acesso às funções serverless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsConfig {
    /// URL base das funções (ex.: `https://<projeto>/functions/v1`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chave da API enviada nos cabeçalhos `Authorization` e `apikey`.
    #[serde(default)]
    pub api_key: String,

    /// Timeout da requisição HTTP em segundos, independente do timeout por tentativa.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// Valor padrão da URL base: instância local.
fn default_base_url() -> String {
    "http://localhost:54321/functions/v1".to_string()
}

// Valor padrão do timeout HTTP: 30s.
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl FleetConfig {
    /// Carrega a configuração de `fleetwatch.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração de um caminho explícito.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(FleetError::from)?;
            toml::from_str::<FleetConfig>(&contents).map_err(FleetError::from)?
        } else {
            Self::default()
        };

        // Variáveis de ambiente têm precedência sobre o arquivo.
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Aplica sobrescritas vindas de `lookup` (normalmente o ambiente do processo).
    /// Valores vazios são ignorados.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV)
            && !key.is_empty()
        {
            self.functions.api_key = key;
        }
        if let Some(url) = lookup(FUNCTIONS_URL_ENV)
            && !url.is_empty()
        {
            self.functions.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), FleetError> {
        self.executor
            .validate()
            .map_err(|e| FleetError::Config(e.message))?;
        if self.functions.request_timeout_secs == 0 {
            return Err(FleetError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
