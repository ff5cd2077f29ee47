use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

/// Variables substituted into `{{KEY}}` placeholders before a request is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Environment {
    variables: Vec<EnvironmentVariable>,
}

impl Environment {
    pub fn new(variables: Vec<EnvironmentVariable>) -> Self {
        Environment { variables }
    }

    pub fn variables(&self) -> &[EnvironmentVariable] {
        &self.variables
    }

    /// Adds an enabled variable, replacing one with the same key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let variable = EnvironmentVariable {
            key: key.into(),
            value: value.into(),
            enabled: true,
        };
        match self.variables.iter_mut().find(|v| v.key == variable.key) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    /// Replaces an existing variable; unknown keys are ignored.
    pub fn update(&mut self, variable: EnvironmentVariable) {
        if let Some(existing) = self.variables.iter_mut().find(|v| v.key == variable.key) {
            *existing = variable;
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.variables.retain(|v| v.key != key);
    }

    pub fn toggle(&mut self, key: &str) {
        if let Some(variable) = self.variables.iter_mut().find(|v| v.key == key) {
            variable.enabled = !variable.enabled;
        }
    }

    /// Replaces `{{KEY}}` placeholders in one left-to-right pass. Values are
    /// inserted as-is, so placeholders inside a value are never expanded.
    pub fn substitute(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let value = after
                .find("}}")
                .and_then(|end| self.enabled_value(&after[..end]).map(|v| (end, v)));
            match value {
                Some((end, value)) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn enabled_value(&self, key: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.enabled && v.key == key)
            .map(|v| v.value.as_str())
    }
}
