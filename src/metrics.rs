//! Metric deriver: per-row punctuality annotations over the mapped frame.
//!
//! Pure function over its input frame. Every derivation is guarded by an
//! explicit column-presence check and degrades to a documented default when
//! its inputs are missing; nothing in here can fail. The deriver must run on
//! arbitrarily incomplete canonical data, including a frame where the mapper
//! resolved zero fields.

use chrono::NaiveDate;

use crate::data::{month_bucket, parse_date_lenient};
use crate::frame::Frame;
use crate::mapper::{DATA_PREVISTA, DATA_REAL, NOME_TAREFA};

pub const STATUS_PRAZO: &str = "status_prazo";
pub const DIAS_DE_ATRASO: &str = "dias_de_atraso";
pub const TIPO_TAREFA: &str = "tipo_tarefa";
pub const MES_CONCLUSAO: &str = "mes_conclusao";

/// Marker used when a derivation's inputs are missing from the frame.
pub const INDEFINIDO: &str = "Indefinido";

/// Punctuality of a task relative to its due and completion dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPrazo {
    NoPrazo,
    EmAtraso,
    Pendente,
}

impl StatusPrazo {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusPrazo::NoPrazo => "No Prazo",
            StatusPrazo::EmAtraso => "Em Atraso",
            StatusPrazo::Pendente => "Pendente",
        }
    }
}

/// Task category derived from keywords in the task name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoTarefa {
    Fiscal,
    Contabil,
    DeptoPessoal,
    Outros,
    Indefinido,
}

impl TipoTarefa {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoTarefa::Fiscal => "Fiscal",
            TipoTarefa::Contabil => "Contábil",
            TipoTarefa::DeptoPessoal => "Depto. Pessoal",
            TipoTarefa::Outros => "Outros",
            TipoTarefa::Indefinido => INDEFINIDO,
        }
    }
}

/// One category and the lower-cased keywords that select it.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub tipo: TipoTarefa,
    pub keywords: &'static [&'static str],
}

/// Immutable deriver configuration. Rules are tried in order and the first
/// keyword hit wins, so a task name matching both Fiscal and Contábil
/// keywords classifies as Fiscal.
#[derive(Debug, Clone)]
pub struct DeriveConfig {
    pub categories: Vec<CategoryRule>,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        DeriveConfig {
            categories: vec![
                CategoryRule {
                    tipo: TipoTarefa::Fiscal,
                    keywords: &["dctf", "sped", "fiscal", "imposto", "das"],
                },
                CategoryRule {
                    tipo: TipoTarefa::Contabil,
                    keywords: &["balancete", "contábil", "conciliação"],
                },
                CategoryRule {
                    tipo: TipoTarefa::DeptoPessoal,
                    keywords: &["folha", "admissão", "rescisão", "esocial"],
                },
            ],
        }
    }
}

fn classify(task_name: &str, config: &DeriveConfig) -> TipoTarefa {
    let lowered = task_name.to_lowercase();
    config
        .categories
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|rule| rule.tipo)
        .unwrap_or(TipoTarefa::Outros)
}

fn status_and_delay(due: Option<NaiveDate>, done: Option<NaiveDate>) -> (StatusPrazo, i64) {
    // A task with no completion date is always pending, regardless of how
    // the due date compares.
    let status = match (due, done) {
        (_, None) => StatusPrazo::Pendente,
        (Some(due), Some(done)) if done > due => StatusPrazo::EmAtraso,
        _ => StatusPrazo::NoPrazo,
    };
    let delay = match (due, done) {
        // Clamp: same-day or early completion is zero days late, not negative.
        (Some(due), Some(done)) => (done - due).num_days().max(0),
        _ => 0,
    };
    (status, delay)
}

/// Annotates `frame` with `status_prazo`, `dias_de_atraso`, `tipo_tarefa`
/// and `mes_conclusao`.
///
/// Degraded defaults when inputs are unresolvable:
/// - either date column missing → every row `No Prazo`, delay `0`;
/// - `nome_tarefa` missing → every row `Indefinido`;
/// - `data_real_conclusao` missing or unparsable → `mes_conclusao` `Indefinido`.
pub fn derive_metrics(mut frame: Frame, config: &DeriveConfig) -> Frame {
    let due_idx = frame.column_index(DATA_PREVISTA);
    let done_idx = frame.column_index(DATA_REAL);
    let name_idx = frame.column_index(NOME_TAREFA);
    // Punctuality needs both date columns; one-of-two degrades the same as
    // none at all.
    let date_columns = due_idx.zip(done_idx);

    let row_count = frame.rows.len();
    let mut statuses = Vec::with_capacity(row_count);
    let mut delays = Vec::with_capacity(row_count);
    let mut tipos = Vec::with_capacity(row_count);
    let mut months = Vec::with_capacity(row_count);

    for row in 0..row_count {
        let (status, delay) = match date_columns {
            Some((due, done)) => status_and_delay(
                parse_date_lenient(frame.cell(row, due)),
                parse_date_lenient(frame.cell(row, done)),
            ),
            None => (StatusPrazo::NoPrazo, 0),
        };
        statuses.push(status.as_str().to_string());
        delays.push(delay.to_string());

        let tipo = match name_idx {
            Some(idx) => classify(frame.cell(row, idx), config),
            None => TipoTarefa::Indefinido,
        };
        tipos.push(tipo.as_str().to_string());

        let month = done_idx
            .and_then(|idx| parse_date_lenient(frame.cell(row, idx)))
            .map(month_bucket)
            .unwrap_or_else(|| INDEFINIDO.to_string());
        months.push(month);
    }

    frame.push_column(STATUS_PRAZO, statuses);
    frame.push_column(DIAS_DE_ATRASO, delays);
    frame.push_column(TIPO_TAREFA, tipos);
    frame.push_column(MES_CONCLUSAO, months);
    frame
}
