//! Schema mapper: best-effort identification of the canonical task columns.
//!
//! Source spreadsheets name their columns however the exporting system felt
//! like, so each canonical field carries an ordered list of name fragments.
//! Matching is a trimmed, lower-cased substring scan: fragments are tried in
//! priority order and, for each fragment, source columns in their original
//! order. The first hit wins and the scan stops for that field — there is no
//! scoring and no ambiguity resolution beyond ordering. This order-sensitive
//! behavior is a compatibility contract with the spreadsheets already in use;
//! do not replace it with fuzzier matching.
//!
//! When the substring scan misses one of the two date fields, a fallback
//! looks for part columns following the `<prefix>.ano` / `<prefix>.mês` /
//! `<prefix>.dia` convention and synthesizes the date column from them.

use serde::Serialize;

use crate::data::parse_date_lenient;
use crate::frame::Frame;

/// Total number of canonical fields the mapper attempts to resolve.
pub const CANONICAL_FIELD_COUNT: usize = 6;

pub const ID_TAREFA: &str = "id_tarefa";
pub const NOME_TAREFA: &str = "nome_tarefa";
pub const CLIENTE: &str = "cliente";
pub const RESPONSAVEL: &str = "responsavel";
pub const DATA_PREVISTA: &str = "data_prevista_conclusao";
pub const DATA_REAL: &str = "data_real_conclusao";

/// One canonical field and its candidate name fragments, highest priority
/// first. A non-empty `part_prefixes` list enables the year/month/day
/// synthesis fallback for that field: part columns must be named
/// `<prefix>.ano` / `<prefix>.mês` / `<prefix>.dia` with one of these
/// prefixes. The prefixes deliberately overlap none of the substring
/// fragments, otherwise the direct scan would claim the part columns first.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub fragments: &'static [&'static str],
    pub part_prefixes: &'static [&'static str],
}

/// Immutable mapper configuration, passed into [`map_schema`] so the mapper
/// stays a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub fields: Vec<FieldSpec>,
    pub year_suffix: &'static str,
    pub month_suffixes: &'static [&'static str],
    pub day_suffix: &'static str,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            fields: vec![
                FieldSpec {
                    canonical: ID_TAREFA,
                    fragments: &["id", "task id", "processoid"],
                    part_prefixes: &[],
                },
                FieldSpec {
                    canonical: NOME_TAREFA,
                    fragments: &["tarefa", "descrição", "descricao", "task name"],
                    part_prefixes: &[],
                },
                FieldSpec {
                    canonical: CLIENTE,
                    fragments: &["cliente", "nomecliente", "client name"],
                    part_prefixes: &[],
                },
                FieldSpec {
                    canonical: RESPONSAVEL,
                    fragments: &["executor", "assignee", "responsável"],
                    part_prefixes: &[],
                },
                FieldSpec {
                    canonical: DATA_PREVISTA,
                    fragments: &["due date", "prazofatal", "data prevista", "prazo"],
                    part_prefixes: &["vencimento", "fatal"],
                },
                FieldSpec {
                    canonical: DATA_REAL,
                    fragments: &["completion date", "datafinalizacao", "data de conclusão"],
                    part_prefixes: &["finalizacao", "conclusao"],
                },
            ],
            year_suffix: ".ano",
            month_suffixes: &[".mês", ".mes"],
            day_suffix: ".dia",
        }
    }
}

/// How a canonical field was satisfied: an existing column renamed in place,
/// or a column synthesized from separate year/month/day parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingSource {
    Column { name: String },
    Synthesized {
        year: String,
        month: Option<String>,
        day: String,
    },
}

impl MappingSource {
    pub fn describe(&self) -> String {
        match self {
            MappingSource::Column { name } => name.clone(),
            MappingSource::Synthesized { year, month, day } => {
                let month = month.as_deref().unwrap_or("—");
                format!("{year} + {month} + {day} (sintetizada)")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldMapping {
    pub field: String,
    pub source: MappingSource,
}

/// Diagnostic record of what the mapper found, kept for user-facing
/// transparency even when everything resolved.
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub original_columns: Vec<String>,
    pub resolved: Vec<FieldMapping>,
    /// True when fewer than the six canonical fields were resolved. This is
    /// a warning condition, never an error: the pipeline still runs with
    /// degraded defaults downstream.
    pub partial: bool,
}

impl MappingReport {
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn source_for(&self, field: &str) -> Option<&MappingSource> {
        self.resolved
            .iter()
            .find(|m| m.field == field)
            .map(|m| &m.source)
    }

    /// Canonical fields the mapper could not satisfy, in config order.
    pub fn unresolved<'a>(&self, config: &'a MapperConfig) -> Vec<&'a str> {
        config
            .fields
            .iter()
            .map(|f| f.canonical)
            .filter(|name| self.source_for(name).is_none())
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

struct PartColumns {
    year: usize,
    month: Option<usize>,
    day: usize,
}

/// Locates year/month/day part columns for `field`. The trigger requires
/// both a `<prefix>.ano` and a `<prefix>.dia` column for one of the field's
/// part prefixes; the month part is optional (its absence produces an
/// unparsable concatenation and therefore null dates).
fn find_part_columns(frame: &Frame, field: &FieldSpec, config: &MapperConfig) -> Option<PartColumns> {
    let normalized: Vec<String> = frame.headers.iter().map(|h| normalize(h)).collect();
    for prefix in field.part_prefixes {
        let year_name = format!("{prefix}{}", config.year_suffix);
        let Some(year) = normalized.iter().position(|n| *n == year_name) else {
            continue;
        };
        let day_name = format!("{prefix}{}", config.day_suffix);
        let Some(day) = normalized.iter().position(|n| *n == day_name) else {
            continue;
        };
        let month = config.month_suffixes.iter().find_map(|suffix| {
            let month_name = format!("{prefix}{suffix}");
            normalized.iter().position(|n| *n == month_name)
        });
        return Some(PartColumns { year, month, day });
    }
    None
}

fn synthesize_date_column(frame: &mut Frame, canonical: &str, parts: &PartColumns) {
    let values: Vec<String> = (0..frame.rows.len())
        .map(|row| {
            let year = frame.cell(row, parts.year).trim().to_string();
            let month = parts
                .month
                .map(|idx| frame.cell(row, idx).trim().to_string())
                .unwrap_or_default();
            let day = frame.cell(row, parts.day).trim().to_string();
            let composed = format!("{year}-{month}-{day}");
            match parse_date_lenient(&composed) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => String::new(),
            }
        })
        .collect();
    frame.push_column(canonical, values);
}

/// Maps the canonical fields onto `frame`'s columns, renaming hits in place
/// and synthesizing date columns from parts where the direct scan missed.
/// Unmatched source columns pass through untouched, so the returned frame may
/// carry extra columns. When two fields select the same source column, both
/// appear in the report but the higher-priority field keeps the rename; the
/// deriver tolerates the losing field being unaddressable like any other
/// missing column. Never fails: zero resolved fields is a legal outcome.
pub fn map_schema(mut frame: Frame, config: &MapperConfig) -> (Frame, MappingReport) {
    let original_columns = frame.headers.clone();
    let mut resolved = Vec::new();
    let mut renames: Vec<(usize, &'static str)> = Vec::new();
    let mut synthesized: Vec<(&'static str, PartColumns)> = Vec::new();

    for field in &config.fields {
        // Each field scans independently; two fields may select the same
        // source column. The rename pass below lets the higher-priority
        // field keep the column in that case.
        let matched = field.fragments.iter().find_map(|fragment| {
            let fragment = normalize(fragment);
            frame
                .headers
                .iter()
                .position(|column| normalize(column).contains(&fragment))
        });
        if let Some(idx) = matched {
            resolved.push(FieldMapping {
                field: field.canonical.to_string(),
                source: MappingSource::Column {
                    name: frame.headers[idx].clone(),
                },
            });
            renames.push((idx, field.canonical));
            continue;
        }
        if !field.part_prefixes.is_empty()
            && let Some(parts) = find_part_columns(&frame, field, config)
        {
            resolved.push(FieldMapping {
                field: field.canonical.to_string(),
                source: MappingSource::Synthesized {
                    year: frame.headers[parts.year].clone(),
                    month: parts.month.map(|idx| frame.headers[idx].clone()),
                    day: frame.headers[parts.day].clone(),
                },
            });
            synthesized.push((field.canonical, parts));
        }
    }

    let mut renamed = vec![false; frame.headers.len()];
    for (idx, canonical) in renames {
        if !renamed[idx] {
            renamed[idx] = true;
            frame.rename_column(idx, canonical);
        }
    }
    for (canonical, parts) in &synthesized {
        synthesize_date_column(&mut frame, canonical, parts);
    }

    let partial = resolved.len() < CANONICAL_FIELD_COUNT;
    let report = MappingReport {
        original_columns,
        resolved,
        partial,
    };
    (frame, report)
}
