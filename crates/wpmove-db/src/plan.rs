//! The fixed sequence of URL rewrites applied to a WordPress database.

use serde::Serialize;

use crate::request::MigrationRequest;

/// The seven rewrites, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Options,
    Guid,
    PostContent,
    PostContentSrc,
    PostMeta,
    CformsData,
    CformsSettings,
}

impl StepKind {
    pub const ALL: [StepKind; 7] = [
        StepKind::Options,
        StepKind::Guid,
        StepKind::PostContent,
        StepKind::PostContentSrc,
        StepKind::PostMeta,
        StepKind::CformsData,
        StepKind::CformsSettings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StepKind::Options => "Moving Options",
            StepKind::Guid => "Moving GUID",
            StepKind::PostContent => "Moving Content",
            StepKind::PostContentSrc => "Moving Additional Content",
            StepKind::PostMeta => "Moving Post Meta Data",
            StepKind::CformsData => "Moving CForms Data",
            StepKind::CformsSettings => "Moving CForms Settings",
        }
    }

    /// Base table name, before the prefix is applied.
    pub fn base_table(self) -> &'static str {
        match self {
            StepKind::Options | StepKind::CformsSettings => "options",
            StepKind::Guid | StepKind::PostContent | StepKind::PostContentSrc => "posts",
            StepKind::PostMeta => "postmeta",
            StepKind::CformsData => "cformsdata",
        }
    }

    fn statement(self, table: &str) -> String {
        match self {
            StepKind::Options => format!(
                "UPDATE {table} SET option_value = REPLACE(option_value, ?, ?) \
                 WHERE option_name IN ('home','siteurl')"
            ),
            StepKind::Guid => format!("UPDATE {table} SET guid = REPLACE(guid, ?, ?)"),
            StepKind::PostContent | StepKind::PostContentSrc => {
                format!("UPDATE {table} SET post_content = REPLACE(post_content, ?, ?)")
            }
            StepKind::PostMeta => {
                format!("UPDATE {table} SET meta_value = REPLACE(meta_value, ?, ?)")
            }
            StepKind::CformsData => format!(
                "UPDATE {table} SET field_val = REPLACE(field_val, ?, ?) WHERE field_name = 'page'"
            ),
            StepKind::CformsSettings => format!(
                "UPDATE {table} SET option_value = REPLACE(option_value, ?, ?) \
                 WHERE option_name = 'cforms_settings'"
            ),
        }
    }

    fn params(self, from_url: &str, to_url: &str) -> Vec<String> {
        match self {
            StepKind::PostContentSrc => vec![format!("src=\"{from_url}"), format!("src=\"{to_url}")],
            _ => vec![from_url.to_string(), to_url.to_string()],
        }
    }
}

pub const STEP_COUNT: usize = StepKind::ALL.len();

/// A single UPDATE with its bound values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStep {
    pub kind: StepKind,
    pub label: &'static str,
    pub table: String,
    /// SQL with `?` placeholders; only the table name is interpolated.
    pub statement: String,
    pub params: Vec<String>,
}

impl MigrationStep {
    pub fn new(kind: StepKind, table_prefix: &str, from_url: &str, to_url: &str) -> Self {
        let table = format!("{table_prefix}{}", kind.base_table());
        Self {
            kind,
            label: kind.label(),
            statement: kind.statement(&table),
            params: kind.params(from_url, to_url),
            table,
        }
    }

    /// The statement with its values inlined as quoted literals. For display
    /// only; execution always binds `params`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.statement.len() + 64);
        let mut params = self.params.iter();
        for ch in self.statement.chars() {
            if ch == '?'
                && let Some(value) = params.next()
            {
                out.push_str(&quote_literal(value));
                continue;
            }
            out.push(ch);
        }
        out
    }
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Build the seven steps for `request`, in execution order.
pub fn build_steps(request: &MigrationRequest) -> Vec<MigrationStep> {
    StepKind::ALL
        .iter()
        .map(|&kind| {
            MigrationStep::new(
                kind,
                request.table_prefix(),
                request.from_url(),
                request.to_url(),
            )
        })
        .collect()
}
