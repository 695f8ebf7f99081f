/// Builds ticket file content for tests that write tickets directly.
pub struct TicketBuilder {
    id: String,
    title: String,
    status: String,
    dependencies: Vec<String>,
    parent: Option<String>,
    created_at: String,
    updated_at: String,
    extra: Vec<String>,
}

#[allow(dead_code)]
impl TicketBuilder {
    pub fn new(id: &str, status: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Ticket {}", id),
            status: status.to_string(),
            dependencies: Vec::new(),
            parent: None,
            created_at: "2025-07-01T10:00:00Z".to_string(),
            updated_at: "2025-07-01T10:00:00Z".to_string(),
            extra: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_timestamps(mut self, created_at: &str, updated_at: &str) -> Self {
        self.created_at = created_at.to_string();
        self.updated_at = updated_at.to_string();
        self
    }

    /// Adds a raw frontmatter line such as `priority: urgent`.
    pub fn with_line(mut self, line: &str) -> Self {
        self.extra.push(line.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("id: {}\n", self.id));
        out.push_str(&format!("title: {}\n", self.title));
        out.push_str(&format!("status: {}\n", self.status));
        out.push_str(&format!("created_at: {}\n", self.created_at));
        out.push_str(&format!("updated_at: {}\n", self.updated_at));
        if !self.dependencies.is_empty() {
            out.push_str(&format!("dependencies: [{}]\n", self.dependencies.join(", ")));
        }
        if let Some(parent) = self.parent {
            out.push_str(&format!("parent: {}\n", parent));
        }
        for line in self.extra {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("---\n\n# Body\n");
        out
    }
}
