//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AstManagerConfig;
use jsast_syntax::lines::LineIndex;

use crate::files::{FsFile, MemoryFile};
use crate::lint::{self, Finding};
use crate::manager::{AstManager, FetchError, FileHandle};
use crate::metrics::TracingMetrics;
use crate::pipeline::SyntaxTree;
use crate::report::{self, FindingReport, SyntaxReport};

use super::{CliError, CliResult, ExitCode};

/// A parsed file together with the text it was parsed from.
struct Loaded {
    label: String,
    source: String,
    tree: Arc<SyntaxTree>,
}

fn fetch_failed(err: FetchError) -> CliError {
    CliError::failure(format!("Error: {err}"))
}

/// One CLI invocation: the files it touches share a single AST manager.
pub struct Session {
    manager: AstManager,
}

impl Session {
    pub fn new(config: AstManagerConfig) -> Self {
        Self {
            manager: AstManager::new(config).with_metrics(Arc::new(TracingMetrics)),
        }
    }

    pub fn manager(&self) -> &AstManager {
        &self.manager
    }

    async fn load(&self, path: &Path) -> CliResult<Loaded> {
        let file = FsFile::new(path);
        let source = file.text().await.map_err(fetch_failed)?;
        let metadata = file.metadata().await.map_err(fetch_failed)?;
        let buffer = MemoryFile::new(metadata, source.clone());
        let tree = self.manager.get_tree(&buffer).await.map_err(fetch_failed)?;
        Ok(Loaded {
            label: path.display().to_string(),
            source,
            tree,
        })
    }

    /// Parse a file; report syntax errors or dump the tree as JSON.
    pub async fn parse_file(&self, path: &Path, json: bool) -> CliResult<ExitCode> {
        let loaded = self.load(path).await?;
        if json {
            let out = serde_json::to_string_pretty(loaded.tree.as_ref())
                .map_err(|e| CliError::failure(format!("Error serializing tree: {e}")))?;
            println!("{out}");
        } else if !loaded.tree.has_errors() {
            println!(
                "✓ {}: {} statements, {} tokens, {} comments",
                loaded.label,
                loaded.tree.body().len(),
                loaded.tree.tokens.len(),
                loaded.tree.comments.len()
            );
        }
        if !loaded.tree.has_errors() {
            return Ok(ExitCode::SUCCESS);
        }
        if !json {
            eprint!("{}", render_errors(&loaded));
        }
        Ok(ExitCode::FAILURE)
    }

    /// List the recorded tokens.
    pub async fn tokens_file(&self, path: &Path) -> CliResult<ExitCode> {
        let loaded = self.load(path).await?;
        for token in &loaded.tree.tokens {
            println!(
                "{:>5} {:<18} {:>6}..{:<6} {}",
                token.index, token.token_type, token.range.start, token.range.end, token.value
            );
        }
        Ok(ExitCode::SUCCESS)
    }

    /// List dependencies and environments.
    pub async fn deps_file(&self, path: &Path) -> CliResult<ExitCode> {
        let loaded = self.load(path).await?;
        for dependency in &loaded.tree.dependencies {
            println!("{dependency}");
        }
        if !loaded.tree.environments.is_empty() {
            let envs: Vec<_> = loaded.tree.environments.iter().map(|e| e.as_str()).collect();
            println!("environments: {}", envs.join(", "));
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Lint every file; fails when anything was reported.
    pub async fn lint_files(&self, paths: &[PathBuf], compact: bool) -> CliResult<ExitCode> {
        let rules = lint::default_rules();
        let mut problems = 0usize;
        for path in paths {
            let loaded = self.load(path).await?;
            let findings = lint::lint(&loaded.tree, &rules);
            problems += loaded.tree.errors.len() + findings.len();
            eprint!("{}", render_errors(&loaded));
            if compact {
                print!("{}", render_findings_compact(&loaded, &findings));
            } else {
                eprint!("{}", render_findings(&loaded, &findings));
            }
        }
        if problems == 0 {
            println!("✓ {} file(s) clean", paths.len());
            return Ok(ExitCode::SUCCESS);
        }
        println!("{problems} problem(s) in {} file(s)", paths.len());
        Ok(ExitCode::FAILURE)
    }
}

fn render_errors(loaded: &Loaded) -> String {
    loaded
        .tree
        .errors
        .iter()
        .map(|error| report::render(&SyntaxReport::new(error, &loaded.label, &loaded.source)))
        .collect()
}

fn render_findings(loaded: &Loaded, findings: &[Finding]) -> String {
    findings
        .iter()
        .map(|finding| report::render(&FindingReport::new(finding, &loaded.label, &loaded.source)))
        .collect()
}

fn render_findings_compact(loaded: &Loaded, findings: &[Finding]) -> String {
    let lines = LineIndex::new(&loaded.source);
    findings
        .iter()
        .map(|finding| report::finding_line(finding, &loaded.label, &lines) + "\n")
        .collect()
}
