//! Test configuration builder for creating test configs programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for a config directory: `main.toml` plus job files
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
    job_files: Vec<(String, String)>,
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
            job_files: Vec::new(),
        }
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Add a job file `<group>.toml` with raw TOML content
    pub fn with_job_file(mut self, group: &str, content: &str) -> Self {
        self.job_files.push((group.to_string(), content.to_string()));
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), self.main_config.to_toml())
            .expect("Failed to write main.toml");

        for (group, content) in self.job_files {
            fs::write(config_dir.join(format!("{}.toml", group)), content)
                .expect("Failed to write job file");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main configuration builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    url: String,
    method: Option<String>,
    timeout_seconds: u64,
    poll_period_ms: u64,
    username: Option<String>,
    password: Option<String>,
    max_depth: Option<u32>,
}

impl MainConfigBuilder {
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn poll_period(mut self, millis: u64) -> Self {
        self.poll_period_ms = millis;
        self
    }

    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn to_toml(&self) -> String {
        let mut toml = format!(
            "url = \"{}\"\ntimeout_seconds = {}\npoll_period_ms = {}\n",
            self.url, self.timeout_seconds, self.poll_period_ms
        );
        if let Some(method) = &self.method {
            toml.push_str(&format!("method = \"{}\"\n", method));
        }
        if let Some(username) = &self.username {
            toml.push_str(&format!("username = \"{}\"\n", username));
        }
        if let Some(password) = &self.password {
            toml.push_str(&format!("password = \"{}\"\n", password));
        }
        if let Some(depth) = self.max_depth {
            toml.push_str(&format!("\n[params]\nmaxDepth = {}\n", depth));
        }
        toml
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            url: "http://localhost:8778/jolokia".to_string(),
            method: None,
            timeout_seconds: 5,
            poll_period_ms: 1000,
            username: None,
            password: None,
            max_depth: None,
        }
    }
}

/// Built test configuration
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_str(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }
}
