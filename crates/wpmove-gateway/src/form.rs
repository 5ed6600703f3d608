use std::collections::HashMap;

use wpmove_common::{Error, Result};
use wpmove_db::{DatabaseLogin, MigrationRequest};

/// Value of the hidden `actz` field that asks for a migration.
pub const MOVE_ACTION: &str = "move";

/// Every field the form may submit. `move` is the submit button.
const KNOWN_FIELDS: [&str; 8] = [
    "actz", "dbname", "dbuser", "dbpass", "fromURL", "toURL", "prefix", "move",
];

/// What a POST to the form asks for.
#[derive(Debug)]
pub enum Submission {
    ShowForm,
    Move(MigrationRequest),
}

/// Turn submitted `(name, value)` pairs into a [`Submission`].
///
/// Without `actz=move` the form is shown again. Otherwise unknown or
/// repeated field names are rejected and the required fields must all be
/// present.
pub fn parse_submission(fields: &[(String, String)]) -> Result<Submission> {
    let wants_move = fields
        .iter()
        .any(|(name, value)| name == "actz" && value == MOVE_ACTION);
    if !wants_move {
        return Ok(Submission::ShowForm);
    }

    let mut values: HashMap<&str, &str> = HashMap::with_capacity(fields.len());
    for (name, value) in fields {
        if values.insert(name.as_str(), value.as_str()).is_some() {
            return Err(Error::Validation(format!("field {name} submitted twice")));
        }
    }

    if let Some(unknown) = values.keys().find(|name| !KNOWN_FIELDS.contains(*name)) {
        return Err(Error::Validation(format!("unknown field {unknown}")));
    }

    let required = |name: &str| {
        values
            .get(name)
            .copied()
            .ok_or_else(|| Error::Validation(format!("missing field {name}")))
    };

    let login = DatabaseLogin {
        name: required("dbname")?.to_string(),
        user: required("dbuser")?.to_string(),
        password: required("dbpass")?.to_string(),
    };
    let from_url = required("fromURL")?;
    let to_url = required("toURL")?;
    let prefix = values.get("prefix").copied().unwrap_or_default();

    MigrationRequest::new(login, from_url, to_url, prefix).map(Submission::Move)
}
