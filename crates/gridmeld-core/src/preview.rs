use crate::{
    obs,
    resolve::{ResolutionState, Resolver},
    token::{CURRENT_RECORD_TOKEN, CURRENT_USER_TOKEN},
    value::Value,
};

///
/// Placeholders
///
/// Host-supplied identities behind the singleton placeholders. These need
/// no lookup: they are known to the host before any query is assembled.
/// An unset identity substitutes as an empty quoted literal.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Placeholders {
    pub viewer_id: Option<String>,
    pub subject_record_id: Option<String>,
}

impl Placeholders {
    #[must_use]
    pub fn new(
        viewer_id: impl Into<Option<String>>,
        subject_record_id: impl Into<Option<String>>,
    ) -> Self {
        Self {
            viewer_id: viewer_id.into(),
            subject_record_id: subject_record_id.into(),
        }
    }
}

/// Assemble the final executable/preview query string.
///
/// With no merge tokens the compiled query passes through with only the
/// singleton placeholders substituted. While token resolution is pending
/// (`AwaitingRecord`, `AwaitingValues`) or failed (`Error`) the result is
/// the empty string: callers must never execute a query with placeholder
/// text still embedded. Once resolved, every literal occurrence of every
/// token is replaced — absent values substitute as `NULL`, and text
/// values keep the unescaped single-quote contract of
/// [`Value::literal`].
#[must_use]
pub fn assemble(compiled: &str, resolver: &Resolver, placeholders: &Placeholders) -> String {
    if compiled.is_empty() {
        return String::new();
    }

    let assembled = match resolver.state() {
        ResolutionState::NoTokens => substitute_singletons(compiled, placeholders),
        ResolutionState::AwaitingRecord
        | ResolutionState::AwaitingValues
        | ResolutionState::Error => return String::new(),
        ResolutionState::Resolved => {
            // Longest field names first so a token never splices into the
            // middle of another token it prefixes.
            let mut tokens: Vec<_> = resolver.tokens().iter().collect();
            tokens.sort_by_key(|t| std::cmp::Reverse(t.field_name().len()));

            let mut out = compiled.to_string();
            for tok in tokens {
                let literal = resolver
                    .values()
                    .get(tok.field_name())
                    .map_or_else(|| Value::Null.literal(), Value::literal);
                out = out.replace(&tok.placeholder(), &literal);
            }
            substitute_singletons(&out, placeholders)
        }
    };

    obs::metrics::record_preview();
    assembled
}

fn substitute_singletons(query: &str, placeholders: &Placeholders) -> String {
    let viewer = quoted(placeholders.viewer_id.as_deref());
    let subject = quoted(placeholders.subject_record_id.as_deref());
    query
        .replace(CURRENT_USER_TOKEN, &viewer)
        .replace(CURRENT_RECORD_TOKEN, &subject)
}

fn quoted(id: Option<&str>) -> String {
    format!("'{}'", id.unwrap_or_default())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use std::collections::BTreeMap;

    fn resolved(query: &str, entries: &[(&str, Value)]) -> Resolver {
        let mut resolver = Resolver::new();
        let _ = resolver.rescan(query);
        let request = resolver
            .select_record("Account", "001")
            .expect("tokens trigger a fetch");
        let map: BTreeMap<String, Value> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        resolver.apply_values(&request, Ok(map)).expect("fresh");
        resolver
    }

    #[test]
    fn no_tokens_passes_compiled_query_through() {
        let resolver = Resolver::new();
        let query = "SELECT Name FROM Account  LIMIT 100";
        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            query
        );
    }

    #[test]
    fn awaiting_states_are_not_previewable() {
        let query = "SELECT Name FROM Account WHERE Industry = $record.Industry LIMIT 100";
        let mut resolver = Resolver::new();
        let _ = resolver.rescan(query);
        assert_eq!(assemble(query, &resolver, &Placeholders::default()), "");

        let _ = resolver.select_record("Account", "001");
        assert_eq!(assemble(query, &resolver, &Placeholders::default()), "");
    }

    #[test]
    fn failed_fetch_is_not_previewable() {
        let query = "SELECT Name FROM Account WHERE Industry = $record.Industry LIMIT 100";
        let mut resolver = Resolver::new();
        let _ = resolver.rescan(query);
        let request = resolver.select_record("Account", "001").expect("fetch");
        let _ = resolver.apply_values(&request, Err(ResolveError::new("down")));

        assert_eq!(assemble(query, &resolver, &Placeholders::default()), "");
    }

    #[test]
    fn numeric_values_substitute_bare() {
        let query = "SELECT Name FROM Account WHERE Employees = $record.Count LIMIT 100";
        let resolver = resolved(query, &[("Count", Value::Int(5))]);

        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            "SELECT Name FROM Account WHERE Employees = 5 LIMIT 100"
        );
    }

    #[test]
    fn text_substitutes_quoted_without_escaping() {
        let query = "SELECT Name FROM Account WHERE Owner = $record.Name LIMIT 100";
        let resolver = resolved(query, &[("Name", Value::from("O'Brien"))]);

        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            "SELECT Name FROM Account WHERE Owner = 'O'Brien' LIMIT 100"
        );
    }

    #[test]
    fn absent_value_substitutes_null() {
        let query = "SELECT Name FROM Account WHERE Industry = $record.Industry LIMIT 100";
        let resolver = resolved(query, &[("Other", Value::from("x"))]);

        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            "SELECT Name FROM Account WHERE Industry = NULL LIMIT 100"
        );
    }

    #[test]
    fn every_occurrence_is_substituted() {
        let query = "WHERE A = $record.Industry OR B = $record.Industry LIMIT 10";
        let resolver = resolved(query, &[("Industry", Value::from("Energy"))]);

        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            "WHERE A = 'Energy' OR B = 'Energy' LIMIT 10"
        );
    }

    #[test]
    fn prefix_tokens_do_not_splice_into_longer_tokens() {
        let query = "WHERE A = $record.Industry AND B = $record.IndustryCode LIMIT 10";
        let resolver = resolved(
            query,
            &[
                ("Industry", Value::from("Energy")),
                ("IndustryCode", Value::Int(7)),
            ],
        );

        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            "WHERE A = 'Energy' AND B = 7 LIMIT 10"
        );
    }

    #[test]
    fn singletons_substitute_as_quoted_literals() {
        let query = "SELECT Name FROM Case WHERE OwnerId = $currentUserId AND ParentId = $currentRecordId LIMIT 100";
        let resolver = {
            let mut r = Resolver::new();
            let _ = r.rescan(query);
            r
        };
        let placeholders = Placeholders::new(
            Some("005xx0001".to_string()),
            Some("001xx0007".to_string()),
        );

        assert_eq!(
            assemble(query, &resolver, &placeholders),
            "SELECT Name FROM Case WHERE OwnerId = '005xx0001' AND ParentId = '001xx0007' LIMIT 100"
        );
    }

    #[test]
    fn unset_singletons_substitute_empty_quotes() {
        let query = "WHERE OwnerId = $currentUserId LIMIT 1";
        let resolver = Resolver::new();

        assert_eq!(
            assemble(query, &resolver, &Placeholders::default()),
            "WHERE OwnerId = '' LIMIT 1"
        );
    }

    #[test]
    fn empty_compiled_query_assembles_empty() {
        let resolver = Resolver::new();
        assert_eq!(assemble("", &resolver, &Placeholders::default()), "");
    }
}
