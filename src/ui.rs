//! Interface de terminal do eqgen: spinner de progresso e saída colorida.
//!
//! Usa `indicatif` para o spinner e `console` para as cores. O
//! [`GenerationProgress`] acompanha um job pelos snapshots do serviço.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::state_machine::{JobSnapshot, JobStatus, Provider};
use crate::validator::ValidationReport;

/// Spinner que reflete o `progress` de um job em geração.
pub struct GenerationProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl GenerationProgress {
    /// Inicia o spinner para um teste da idade e backend dados.
    pub fn start(age: u8, provider: Provider) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Generating test for age {age} via {provider}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Atualiza a mensagem com o progresso mais recente.
    pub fn update(&self, snapshot: &JobSnapshot) {
        self.pb.set_message(format!(
            "[{}] {}",
            snapshot.current_section, snapshot.progress
        ));
    }

    /// Finaliza o spinner e mostra o resultado.
    pub fn finish(&self, snapshot: &JobSnapshot) {
        self.pb.finish_and_clear();
        match snapshot.status {
            JobStatus::Completed => eprintln!(
                "  {} Test written to {}",
                self.green.apply_to("✓"),
                snapshot.file_path.as_deref().unwrap_or("?")
            ),
            _ => eprintln!(
                "  {} Generation failed: {}",
                self.red.apply_to("✗"),
                snapshot.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Imprime o snapshot em JSON no stdout.
pub fn print_snapshot(snapshot: &JobSnapshot) {
    println!(
        "{}",
        serde_json::to_string_pretty(snapshot).unwrap_or_default()
    );
}

/// Mostra o resultado da validação de um arquivo.
pub fn print_report(file: &str, report: &ValidationReport) {
    if report.ok {
        println!("{} {file}: valid", Style::new().green().bold().apply_to("✓"));
        return;
    }

    println!(
        "{} {file}: {} defect(s)",
        Style::new().red().bold().apply_to("✗"),
        report.defects.len()
    );
    let dim = Style::new().dim();
    for defect in &report.defects {
        println!("  {} {defect}", dim.apply_to("-"));
    }
}

/// Cabeçalho usado ao listar prompts.
pub fn prompt_heading(title: &str) -> String {
    Style::new()
        .cyan()
        .bold()
        .apply_to(format!("─── {title} ───"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::Job;

    #[test]
    fn progress_lifecycle_does_not_panic() {
        let job = Job::new(15, Provider::Ollama);
        let snapshot = JobSnapshot::from(&job);

        let progress = GenerationProgress::start(15, Provider::Ollama);
        progress.update(&snapshot);
        progress.finish(&snapshot);
    }

    #[test]
    fn heading_contains_title() {
        assert!(prompt_heading("Branch 1").contains("Branch 1"));
    }
}
