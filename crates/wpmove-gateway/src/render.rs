use serde::Serialize;
use tera::{Context, Tera};
use wpmove_common::{Error, Result};
use wpmove_db::{MigrationReport, StepOutcome};
use wpmove_security::DEFAULT_TABLE_PREFIX;

const FORM_TEMPLATE: &str = r#"<html>
 <head>
 <title>Wordpress Mover</title>
 </head>
 <body>
 <h1>Move Your Wordpress Site!</h1>
 <form name="info" method="POST" action="/">
  <input type="hidden" name="actz" value="move">
  <h3>Database Info</h3>
  <b>Database Name:</b> <input type="text" name="dbname" size="30"><br />
  <b>Database User:</b> <input type="text" name="dbuser" size="30"><br />
  <b>Database Password:</b> <input type="password" name="dbpass" size="30"><br />
  <h3>Wordpress Info</h3>
  <b>Current (Existing) URL:</b> <input type="text" name="fromURL" size="30"><br />
  <b>New Location URL:</b> <input type="text" name="toURL" size="30"><br />
  <b>Table Prefix:</b> <input type="text" name="prefix" size="10" value="{{ default_prefix }}"><br />
  <br />
  <input type="submit" value="Move It!" name="move">
 </form>
 </body>
</html>
"#;

const REPORT_TEMPLATE: &str = r#"<html>
 <head>
 <title>Wordpress Mover</title>
 </head>
 <body>
{% if connection_error -%}
<h1>ERROR</h1>
<h3>Could Not Connect:</h3>
{{ connection_error }}
{%- else -%}
<h1>Moving Wordpress</h1>
{% for step in steps -%}
<b>{{ step.label }}:</b> &nbsp;&nbsp;
{% if step.error %}ERROR:{{ step.error }}{% else %}{{ step.rows }} rows changed<br />{% endif %}
{% endfor -%}
{% if transaction %}<p>{{ transaction }}</p>
{% endif -%}
{% if complete %}<h3>COMPLETE</h3>
{% endif -%}
{%- endif %}
 </body>
</html>
"#;

const REJECTED_TEMPLATE: &str = r#"<html>
 <head>
 <title>Wordpress Mover</title>
 </head>
 <body>
<h1>ERROR</h1>
<h3>Invalid Submission:</h3>
{{ message }}
<p><a href="/">Back to the form</a></p>
 </body>
</html>
"#;

#[derive(Serialize)]
struct StepLine<'a> {
    label: &'a str,
    rows: Option<u64>,
    error: Option<&'a str>,
}

/// Renders the HTML pages. Templates are compiled once at startup and every
/// interpolated value is HTML-escaped.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("form.html", FORM_TEMPLATE),
            ("report.html", REPORT_TEMPLATE),
            ("rejected.html", REJECTED_TEMPLATE),
        ])
        .map_err(|e| Error::Template(format!("invalid template: {e}")))?;
        Ok(Self { tera })
    }

    pub fn form(&self) -> Result<String> {
        let mut context = Context::new();
        context.insert("default_prefix", DEFAULT_TABLE_PREFIX);
        self.render("form.html", &context)
    }

    pub fn report(&self, report: &MigrationReport) -> Result<String> {
        let steps: Vec<StepLine<'_>> = report
            .results
            .iter()
            .map(|r| match &r.outcome {
                StepOutcome::Success { rows_affected } => StepLine {
                    label: r.step.label,
                    rows: Some(*rows_affected),
                    error: None,
                },
                StepOutcome::Failure { message } => StepLine {
                    label: r.step.label,
                    rows: None,
                    error: Some(message),
                },
            })
            .collect();

        let mut context = Context::new();
        context.insert("connection_error", &report.connection_error);
        context.insert("steps", &steps);
        context.insert(
            "transaction",
            &report.transaction.as_ref().map(ToString::to_string),
        );
        context.insert("complete", &report.is_complete());
        self.render("report.html", &context)
    }

    pub fn rejected(&self, message: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render("rejected.html", &context)
    }

    fn render(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| Error::Template(format!("failed to render {name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use wpmove_db::{MigrationStep, StepKind, StepResult};

    use super::*;

    fn step(kind: StepKind) -> MigrationStep {
        MigrationStep::new(kind, "wp_", "http://a.com", "http://b.com")
    }

    #[test]
    fn form_lists_every_field() {
        let html = PageRenderer::new().unwrap().form().unwrap();
        for field in ["actz", "dbname", "dbuser", "dbpass", "fromURL", "toURL", "prefix"] {
            assert!(html.contains(&format!("name=\"{field}\"")), "missing {field}");
        }
        assert!(html.contains("value=\"wp_\""));
    }

    #[test]
    fn complete_report_lists_steps_and_marker() {
        let mut report = MigrationReport::new(Uuid::nil());
        for kind in StepKind::ALL {
            report.results.push(StepResult::success(step(kind), 4));
        }

        let html = PageRenderer::new().unwrap().report(&report).unwrap();
        assert!(html.contains("<h1>Moving Wordpress</h1>"));
        assert!(html.contains("<b>Moving Options:</b> &nbsp;&nbsp;\n4 rows changed<br />"));
        assert_eq!(html.matches("rows changed").count(), 7);
        assert!(html.contains("<h3>COMPLETE</h3>"));
    }

    #[test]
    fn failed_step_is_escaped_and_has_no_marker() {
        let mut report = MigrationReport::new(Uuid::nil());
        report.results.push(StepResult::success(step(StepKind::Options), 2));
        report.results.push(StepResult::failure(
            step(StepKind::Guid),
            "near \"<script>\": syntax error",
        ));

        let html = PageRenderer::new().unwrap().report(&report).unwrap();
        assert!(html.contains("ERROR:near &quot;&lt;script&gt;&quot;: syntax error"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("COMPLETE"));
    }

    #[test]
    fn connection_error_page_shows_only_the_error() {
        let report = MigrationReport::connection_failed(Uuid::nil(), "Connection refused");
        let html = PageRenderer::new().unwrap().report(&report).unwrap();
        assert!(html.contains("<h3>Could Not Connect:</h3>\nConnection refused"));
        assert!(!html.contains("Moving Wordpress"));
        assert!(!html.contains("rows changed"));
    }
}
