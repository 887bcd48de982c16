//! Interface de terminal do fleetwatch — spinner e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner de progresso e `console` para
//! estilização com cores. O [`OperationProgress`] acompanha visualmente
//! uma chamada ao executor no terminal.

use chrono::{DateTime, Utc};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use fleetwatch::{OperationError, OperationOutcome};

/// Registro final de uma operação, impresso em JSON.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReport {
    pub operation: String,
    pub status: &'static str,
    pub attempts: u32,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
    pub completed_at: DateTime<Utc>,
}

impl OutcomeReport {
    /// Gera o registro a partir do resultado do executor.
    pub fn from_outcome<T>(
        operation: &str,
        outcome: &OperationOutcome<T>,
        message: impl FnOnce(&T) -> Option<String>,
    ) -> Self {
        let (status, message, error) = match outcome {
            OperationOutcome::Success { value, .. } => ("success", message(value), None),
            OperationOutcome::Failure { error, .. } => ("failure", None, Some(error.clone())),
        };
        Self {
            operation: operation.to_string(),
            status,
            attempts: outcome.attempts(),
            elapsed_ms: outcome.elapsed_ms(),
            message,
            error,
            completed_at: Utc::now(),
        }
    }
}

/// Indicador visual de progresso para uma operação no terminal.
///
/// Exibe um spinner animado enquanto o executor trabalha e mensagens
/// coloridas para sucesso (verde) e falha (vermelho).
pub struct OperationProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
    // Estilo verde para mensagens de sucesso.
    green: Style,
    // Estilo vermelho para mensagens de falha.
    red: Style,
}

impl OperationProgress {
    /// Inicia o spinner com o nome da operação.
    pub fn start(operation: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{operation}..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Finaliza o spinner e exibe o resultado.
    ///
    /// Sucesso mostra o número de tentativas; falha mostra apenas a mensagem
    /// do erro, nunca detalhes internos.
    pub fn complete(&self, report: &OutcomeReport) {
        self.pb.finish_and_clear();
        match &report.error {
            None => {
                println!(
                    "  {} {} succeeded after {} attempt(s) in {}ms",
                    self.green.apply_to("✓"),
                    report.operation,
                    report.attempts,
                    report.elapsed_ms
                );
            }
            Some(error) => {
                println!(
                    "  {} {} failed: {}",
                    self.red.apply_to("✗"),
                    report.operation,
                    error.message
                );
            }
        }
    }

    /// Imprime o registro formatado em JSON.
    pub fn print_report(&self, report: &OutcomeReport) {
        let style = if report.error.is_none() {
            &self.green
        } else {
            &self.red
        };
        println!();
        println!("{}", style.apply_to("─── Outcome ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        );
    }
}
