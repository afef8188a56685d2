//! Interface de linha de comando do eqgen baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, generate,
//! prompts, validate) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// eqgen: gerador de testes de inteligência emocional para adolescentes.
#[derive(Debug, Parser)]
#[command(name = "eqgen", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Arquivo de configuração TOML (padrão: `eqgen.toml`, se existir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sobe o serviço HTTP.
    Serve {
        /// Endereço de escuta; sobrescreve `HOST`.
        #[arg(long)]
        host: Option<String>,

        /// Porta de escuta; sobrescreve `PORT`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Gera um teste completo neste processo e imprime o resultado em JSON.
    Generate {
        /// Idade do público-alvo (12 a 18).
        #[arg(long, default_value_t = 15, allow_negative_numbers = true)]
        age: i64,

        /// Backend: `ollama` ou `deepseek` (padrão: configuração).
        #[arg(long)]
        provider: Option<String>,
    },

    /// Mostra os prompts enviados ao modelo para uma idade.
    Prompts {
        #[arg(long, default_value_t = 15, allow_negative_numbers = true)]
        age: i64,

        /// Apenas um ramo (1 a 4).
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        branch: Option<u8>,
    },

    /// Valida a estrutura de um teste já salvo.
    Validate {
        /// Caminho do arquivo `.txt`.
        file: PathBuf,
    },
}
