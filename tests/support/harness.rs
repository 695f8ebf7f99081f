use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use trackdown::config::{Config, GLOBAL_CONFIG_ENV};
use trackdown::ticket::TicketDocument;

/// TestHarness provides an isolated, initialized aitrackdown project.
/// Each harness creates a temporary directory with `.aitrackdown/config.md`
/// and a `tasks/` tickets directory, and runs the binary inside it with the
/// global config pointed at a file that does not exist.
pub struct TestHarness {
    pub dir: TempDir,
    pub tickets_dir: PathBuf,
    #[allow(dead_code)]
    pub config_path: PathBuf,
    pub binary: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let harness = Self::uninitialized();
        fs::create_dir_all(harness.path().join(trackdown::paths::TEMPLATES_DIR))
            .expect("Failed to create .aitrackdown");
        fs::create_dir_all(&harness.tickets_dir).expect("Failed to create tickets dir");
        fs::write(&harness.config_path, Config::render_default("test-project"))
            .expect("Failed to write config");
        harness
    }

    /// A temporary directory without any aitrackdown files.
    pub fn uninitialized() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let base = dir.path();
        TestHarness {
            tickets_dir: base.join("tasks"),
            config_path: base.join(trackdown::paths::CONFIG_FILE),
            binary: PathBuf::from(env!("CARGO_BIN_EXE_aitrackdown")),
            dir,
        }
    }

    /// Creates a harness whose config file has the given content.
    #[allow(dead_code)]
    pub fn with_config(config_content: &str) -> Self {
        let harness = Self::new();
        fs::write(&harness.config_path, config_content).expect("Failed to write custom config");
        harness
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Runs the binary with `args` in the harness directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary)
            .args(args)
            .current_dir(self.path())
            .env(GLOBAL_CONFIG_ENV, self.path().join("no-global-config.md"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run aitrackdown")
    }

    /// Runs the binary and asserts success, returning stdout.
    #[allow(dead_code)]
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "aitrackdown {:?} failed:\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Creates a ticket through the CLI and returns its ID.
    #[allow(dead_code)]
    pub fn create(&self, ticket_type: &str, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["-q", "create", ticket_type, title];
        args.extend_from_slice(extra);
        self.run_ok(&args).trim().to_string()
    }

    /// Writes a ticket file at `relative` under the tickets directory.
    #[allow(dead_code)]
    pub fn write_ticket(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.tickets_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create ticket dir");
        }
        fs::write(&path, content).expect("Failed to write ticket file");
        path
    }

    /// Loads a ticket from its canonical location.
    #[allow(dead_code)]
    pub fn load_ticket(&self, id: &str) -> TicketDocument {
        let prefix = id.split('-').next().unwrap_or_default().to_lowercase();
        let path = self.tickets_dir.join(prefix).join(format!("{}.md", id));
        TicketDocument::load(&path).expect("Failed to load ticket")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
