use std::fmt;

use serde::{Deserialize, Serialize};

use crate::level::Level;

/// One classified difference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    pub level: Level,
    pub text: String,
    /// Upper-case method, empty for document-level findings.
    pub operation: String,
    pub operation_id: String,
    pub path: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
}

impl Finding {
    pub fn is_breaking(&self) -> bool {
        self.level.is_breaking()
    }

    fn sort_key(&self) -> (&str, &str, &str, &str, &str) {
        (&self.path, &self.operation, &self.id, &self.text, &self.source)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.level, self.id)?;
        if !self.source.is_empty() {
            write!(f, " at {}", self.source)?;
        }
        if self.operation.is_empty() {
            writeln!(f)?;
        } else {
            writeln!(f, "\n\tin API {} {}", self.operation, self.path)?;
        }
        write!(f, "\t\t{}", self.text)
    }
}

/// Sort into the stable report order: path, operation, id, then text and
/// source.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(path: &str, operation: &str, id: &str, text: &str) -> Finding {
        Finding {
            id: id.into(),
            level: Level::Error,
            text: text.into(),
            operation: operation.into(),
            operation_id: String::new(),
            path: path.into(),
            source: "rev.json".into(),
            comment: None,
            todo: None,
        }
    }

    #[test]
    fn sorts_by_path_operation_id_then_text() {
        let mut findings = vec![
            finding("/b", "GET", "a-rule", "x"),
            finding("/a", "POST", "a-rule", "x"),
            finding("/a", "GET", "z-rule", "x"),
            finding("/a", "GET", "a-rule", "y"),
            finding("/a", "GET", "a-rule", "x"),
        ];
        sort_findings(&mut findings);
        let order: Vec<_> = findings
            .iter()
            .map(|f| format!("{} {} {} {}", f.path, f.operation, f.id, f.text))
            .collect();
        assert_eq!(
            order,
            vec![
                "/a GET a-rule x",
                "/a GET a-rule y",
                "/a GET z-rule x",
                "/a POST a-rule x",
                "/b GET a-rule x",
            ]
        );
    }

    #[test]
    fn display_includes_endpoint() {
        let f = finding("/pets", "GET", "api-tag-removed", "removed tag 'pets'");
        let text = f.to_string();
        assert!(text.starts_with("ERROR [api-tag-removed] at rev.json"));
        assert!(text.contains("in API GET /pets"));
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let value = serde_json::to_value(finding("/", "GET", "x", "t")).unwrap();
        assert!(value.get("comment").is_none());
        assert_eq!(value["operationId"], "");
    }
}
