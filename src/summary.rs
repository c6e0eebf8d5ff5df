//! Best-effort diagnostic summary via an OpenAI-compatible chat endpoint.
//!
//! The annotated frame is sampled into a bounded prompt (first
//! [`SAMPLE_ROWS`] rows of the columns in [`SAMPLE_COLUMNS`] that exist) and
//! sent as a single blocking chat-completions request. Failures here must
//! never affect the already-emitted annotated table; the caller catches the
//! error and reports it as a warning.

use anyhow::{Context, Result, anyhow, bail};
use itertools::Itertools;

use crate::frame::Frame;
use crate::mapper::{CLIENTE, RESPONSAVEL};
use crate::metrics::{DIAS_DE_ATRASO, STATUS_PRAZO, TIPO_TAREFA};

/// Row cap for the prompt sample, keeping the request bounded regardless of
/// spreadsheet size.
pub const SAMPLE_ROWS: usize = 50;

/// Columns serialized into the prompt, restricted to those present.
pub const SAMPLE_COLUMNS: &[&str] = &[CLIENTE, RESPONSAVEL, STATUS_PRAZO, TIPO_TAREFA, DIAS_DE_ATRASO];

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "Você é um consultor especialista em gestão de \
escritórios de contabilidade. Responda em português, de forma objetiva e \
acionável.";

/// Renders the sampled subset as `;`-delimited text inside the fixed
/// instruction template.
pub fn build_prompt(frame: &Frame) -> String {
    let columns: Vec<(usize, &str)> = SAMPLE_COLUMNS
        .iter()
        .filter_map(|name| frame.column_index(name).map(|idx| (idx, *name)))
        .collect();

    let header = columns.iter().map(|(_, name)| *name).join(";");
    let lines = frame
        .rows
        .iter()
        .take(SAMPLE_ROWS)
        .map(|row| {
            columns
                .iter()
                .map(|(idx, _)| row.get(*idx).map(|s| s.as_str()).unwrap_or(""))
                .join(";")
        })
        .join("\n");

    format!(
        "Analise a amostra abaixo de tarefas de um escritório de contabilidade \
(colunas separadas por ';') e produza um diagnóstico gerencial: principais \
gargalos de prazo, clientes e responsáveis mais afetados, distribuição por \
tipo de tarefa e três recomendações práticas.\n\n{header}\n{lines}"
    )
}

/// Minimal blocking client for the chat-completions API.
pub struct SummaryClient {
    api_key: String,
    base_url: String,
    model: String,
}

impl SummaryClient {
    pub fn new(api_key: String, model: String) -> Self {
        SummaryClient {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    /// Points the client at an alternate OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sends one chat request and returns the primary text payload verbatim.
    pub fn summarize(&self, prompt: &str) -> Result<String> {
        let client = reqwest::blocking::Client::new();
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.3
        });

        let response = client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("Sending summarization request")?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .context("Decoding summarization response")?;
        if !status.is_success() {
            let detail = payload["error"]["message"].as_str().unwrap_or("sem detalhes");
            bail!("Summarization service returned {status}: {detail}");
        }

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Summarization response carried no message content"))?;
        Ok(content.to_string())
    }
}
