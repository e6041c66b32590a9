//! Surface name ↔ ID associations, scoped per body.

/// One name/code/body association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceName {
    pub name: String,
    pub code: i32,
    pub body: i32,
}

/// Registry of surface names. Names compare case-insensitively with runs of
/// blanks treated as a single blank.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    entries: Vec<SurfaceName>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an association. A later entry for the same name and body
    /// replaces the earlier one.
    pub fn add(&mut self, name: &str, code: i32, body: i32) -> &mut Self {
        let key = normalize_surface_name(name);
        self.entries
            .retain(|entry| !(entry.body == body && entry.name == key));
        self.entries.push(SurfaceName {
            name: key,
            code,
            body,
        });
        self
    }

    /// Surface ID for a name on the given body.
    pub fn code_for(&self, name: &str, body: i32) -> Option<i32> {
        let key = normalize_surface_name(name);
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.body == body && entry.name == key)
            .map(|entry| entry.code)
    }

    /// Name registered for a surface ID on the given body.
    pub fn name_for(&self, code: i32, body: i32) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.body == body && entry.code == code)
            .map(|entry| entry.name.as_str())
    }

    pub fn entries(&self) -> &[SurfaceName] {
        &self.entries
    }
}

/// Canonical form of a surface name: trimmed, upper case, single blanks.
pub fn normalize_surface_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_blank_runs() {
        let mut registry = SurfaceRegistry::new();
        registry
            .add("Mars MEGDR 128 PIXEL/DEG", 1, 499)
            .add("Mars MEGDR 64 PIXEL/DEG", 2, 499)
            .add("Mars_MRO_HIRISE", 3, 499);

        assert_eq!(registry.code_for(" mars megdr  128  pixel/deg ", 499), Some(1));
        assert_eq!(registry.code_for("MARS MEGDR128PIXEL/DEG", 499), None);
        assert_eq!(registry.code_for("mars_mro_hirise", 401), None);
        assert_eq!(registry.name_for(2, 499), Some("MARS MEGDR 64 PIXEL/DEG"));
    }
}
