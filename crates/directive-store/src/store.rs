// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The directive store: enumerate ready candidates, claim, rewrite
//! status, relocate, and write new directive/artifact pairs (§4.1).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directive_core::{rank_or_unknown, Directive, DirectiveId, DirectiveStatus, OutputArtifact, Sanitizer, TemplateRenderer};

use crate::error::StoreError;
use crate::header::{parse_directive_file, serialize_directive_file};
use crate::lifecycle::{exemplar_read_names, LifecycleState, PROCESSING_DIR};

/// A directive that has successfully completed the claim round-trip and is
/// now owned exclusively by this worker for the rest of the pass.
#[derive(Debug, Clone)]
pub struct ClaimedDirective {
    pub directive: Directive,
    pub task: String,
    pub directive_path: PathBuf,
    pub artifact_path: PathBuf,
}

/// The directory-per-state on-disk queue rooted at `root` (e.g.
/// `<project>/directives/`).
#[derive(Debug, Clone)]
pub struct DirectiveStore {
    root: PathBuf,
}

impl DirectiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every lifecycle folder plus the claim staging directory.
    pub fn init(&self) -> Result<(), StoreError> {
        for state in LifecycleState::all() {
            self.ensure_dir(state.dir_name())?;
        }
        self.ensure_dir(PROCESSING_DIR)?;
        Ok(())
    }

    fn ensure_dir(&self, name: &str) -> Result<(), StoreError> {
        let path = self.root.join(name);
        fs::create_dir_all(&path).map_err(|e| StoreError::fs(path.display().to_string(), e))
    }

    fn dir_path(&self, state: LifecycleState) -> PathBuf {
        self.root.join(state.dir_name())
    }

    /// Every terminal directory the `exemplar` alias can read from, plus
    /// the other three terminal states (`success`, `failed`, `slow`).
    fn terminal_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.dir_path(LifecycleState::Success), self.dir_path(LifecycleState::Failed), self.dir_path(LifecycleState::Slow)];
        for name in exemplar_read_names() {
            dirs.push(self.root.join(name));
        }
        dirs
    }

    /// Directive-prefixed `.md` files directly under `dir` (output artifact
    /// files are named `output-*` and are skipped here).
    fn list_directive_files(&self, dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else { return Vec::new() };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.file_name().and_then(|n| n.to_str()).map(|n| !n.starts_with("output-")).unwrap_or(false))
            .collect()
    }

    fn read_and_parse(&self, path: &Path) -> Option<(Directive, String)> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read directive file, skipping");
                return None;
            }
        };
        match parse_directive_file(&text) {
            Ok((directive, body)) => Some((directive, extract_task(&body))),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "malformed directive header, skipping");
                None
            }
        }
    }

    /// Collect every id/slug/todo-id resolved by something sitting in a
    /// terminal folder right now.
    fn resolved_references(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        let mut ids = Vec::new();
        let mut slugs = Vec::new();
        let mut todo_ids = Vec::new();
        for dir in self.terminal_dirs() {
            for path in self.list_directive_files(&dir) {
                if let Some((directive, _)) = self.read_and_parse(&path) {
                    ids.push(directive.id.to_string());
                    slugs.push(directive.slug.clone());
                    if let Some(todo_id) = directive.todo_id {
                        todo_ids.push(todo_id);
                    }
                }
            }
        }
        (ids, slugs, todo_ids)
    }

    /// Enumerate every ready candidate in `new` (prerequisites satisfied),
    /// sorted by (priority descending, age descending, id ascending) (§4.1,
    /// §8). "Age" is the directive's own `created` header timestamp —
    /// older directives sort first.
    pub fn enumerate_ready(&self) -> Vec<Directive> {
        let (ids, slugs, todo_ids) = self.resolved_references();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let slug_refs: Vec<&str> = slugs.iter().map(String::as_str).collect();
        let todo_refs: Vec<&str> = todo_ids.iter().map(String::as_str).collect();

        let mut ready: Vec<Directive> = self
            .list_directive_files(&self.dir_path(LifecycleState::New))
            .into_iter()
            .filter_map(|path| self.read_and_parse(&path).map(|(d, task)| (d, task)))
            .filter(|(directive, _)| directive.prerequisites_satisfied(&id_refs, &slug_refs, &todo_refs))
            .map(|(mut directive, task)| {
                directive.task = task;
                directive
            })
            .collect();

        ready.sort_by(|a, b| {
            rank_or_unknown(Some(b.priority))
                .cmp(&rank_or_unknown(Some(a.priority)))
                .then(a.created.cmp(&b.created))
                .then(a.id.to_string().cmp(&b.id.to_string()))
        });
        ready
    }

    /// Every directive file in every lifecycle folder, paired with the
    /// state it was found in (§4.7's bridge "scan" operation). `Exemplar`
    /// covers both the canonical name and the legacy alias.
    pub fn scan_all(&self) -> Vec<(Directive, LifecycleState)> {
        let mut out = Vec::new();
        for state in [LifecycleState::New, LifecycleState::Success, LifecycleState::Failed, LifecycleState::Slow] {
            for path in self.list_directive_files(&self.dir_path(state)) {
                if let Some((directive, _)) = self.read_and_parse(&path) {
                    out.push((directive, state));
                }
            }
        }
        for name in exemplar_read_names() {
            for path in self.list_directive_files(&self.root.join(name)) {
                if let Some((directive, _)) = self.read_and_parse(&path) {
                    out.push((directive, LifecycleState::Exemplar));
                }
            }
        }
        out
    }

    fn find_new_file(&self, id: &DirectiveId) -> Option<PathBuf> {
        self.list_directive_files(&self.dir_path(LifecycleState::New))
            .into_iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()).map(|n| n.contains(id.as_str())).unwrap_or(false))
    }

    /// Atomic claim: rename the file into `processing/` and immediately
    /// back (§4.1, §9). A missing source means another worker claimed it
    /// first — not an error, just "skip this pass".
    pub fn claim(&self, id: &DirectiveId) -> Result<Option<ClaimedDirective>, StoreError> {
        let Some(new_path) = self.find_new_file(id) else { return Ok(None) };
        let filename = new_path.file_name().expect("listed path always has a filename").to_os_string();
        let staging_path = self.root.join(PROCESSING_DIR).join(&filename);

        if fs::rename(&new_path, &staging_path).is_err() {
            // Either raced away or a filesystem error; either way this
            // candidate is unavailable this cycle.
            return Ok(None);
        }
        if let Err(err) = fs::rename(&staging_path, &new_path) {
            return Err(StoreError::fs(staging_path.display().to_string(), err));
        }

        let Some((directive, task)) = self.read_and_parse(&new_path) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        let artifact_path = self.artifact_path_for(&directive);
        let directive = Directive { task: task.clone(), ..directive };
        Ok(Some(ClaimedDirective { directive, task, directive_path: new_path, artifact_path }))
    }

    fn artifact_path_for(&self, directive: &Directive) -> PathBuf {
        self.dir_path(LifecycleState::New).join(format!("output-{}-{}.md", directive.slug, directive.id))
    }

    /// Rewrite only the `status` field of a directive file in place,
    /// preserving everything else (§4.1, §4.6 step 9).
    pub fn rewrite_status(&self, directive_path: &Path, new_status: DirectiveStatus) -> Result<(), StoreError> {
        let text = fs::read_to_string(directive_path).map_err(|e| StoreError::fs(directive_path.display().to_string(), e))?;
        let (mut directive, body) = parse_directive_file(&text)?;
        directive.status = new_status;
        let rewritten = serialize_directive_file(&directive, &body);
        fs::write(directive_path, rewritten).map_err(|e| StoreError::fs(directive_path.display().to_string(), e))
    }

    /// Relocate a claimed directive's pair of files to a terminal folder.
    /// Both renames are atomic; if the directive file move succeeds but
    /// the artifact move fails, the artifact is left behind in `new` and
    /// the error is surfaced — callers should treat this as a filesystem
    /// error for the pass (§7 kind 8) rather than relocating only half
    /// the pair.
    pub fn relocate(&self, directive_path: &Path, artifact_path: &Path, target: LifecycleState) -> Result<(PathBuf, PathBuf), StoreError> {
        let target_dir = self.dir_path(target);
        fs::create_dir_all(&target_dir).map_err(|e| StoreError::fs(target_dir.display().to_string(), e))?;

        let directive_filename = directive_path.file_name().expect("directive path has a filename");
        let artifact_filename = artifact_path.file_name().expect("artifact path has a filename");
        let new_directive_path = target_dir.join(directive_filename);
        let new_artifact_path = target_dir.join(artifact_filename);

        fs::rename(directive_path, &new_directive_path)
            .map_err(|e| StoreError::fs(directive_path.display().to_string(), e))?;
        fs::rename(artifact_path, &new_artifact_path)
            .map_err(|e| StoreError::fs(artifact_path.display().to_string(), e))?;

        Ok((new_directive_path, new_artifact_path))
    }

    /// Write a freshly decomposed directive plus its placeholder output
    /// artifact into `new` (§4.1's "write discipline for new directives").
    pub fn write_new(
        &self,
        directive: &Directive,
        sanitizer: &dyn Sanitizer,
        template: &dyn TemplateRenderer,
    ) -> Result<(PathBuf, PathBuf), StoreError> {
        self.ensure_dir(LifecycleState::New.dir_name())?;

        let filename_base = match sanitizer.sanitize_filename(&format!("{}-{}", directive.slug, directive.id)) {
            Ok(name) => name,
            Err(_) => directive.id.to_string(),
        };
        let directive_path = self.dir_path(LifecycleState::New).join(format!("{filename_base}.md"));

        let mut vars = HashMap::new();
        vars.insert("SLUG".to_string(), directive.slug.clone());
        vars.insert("TASK".to_string(), directive.task.clone());
        let body = template
            .render("directive-prompt", &vars)
            .unwrap_or_else(|_| format!("# {}\n\n## Prompt\n\n{}\n", directive.slug, directive.task));
        let text = serialize_directive_file(directive, &body);
        fs::write(&directive_path, text).map_err(|e| StoreError::fs(directive_path.display().to_string(), e))?;

        let artifact = OutputArtifact::placeholder(directive);
        let artifact_path = self.artifact_path_for(directive);
        let mut artifact_vars = HashMap::new();
        artifact_vars.insert("SLUG".to_string(), artifact.slug.clone());
        artifact_vars.insert("STATUS".to_string(), artifact.status.to_string());
        artifact_vars.insert("PRIORITY".to_string(), artifact.priority.to_string());
        artifact_vars.insert("DIRECTIVE_ID".to_string(), directive.id.to_string());
        let artifact_body = template
            .render("directive-out", &artifact_vars)
            .unwrap_or_else(|_| format!("# {} — Output\n\nStatus: {}\n", artifact.slug, artifact.status));
        fs::write(&artifact_path, artifact_body).map_err(|e| StoreError::fs(artifact_path.display().to_string(), e))?;

        Ok((directive_path, artifact_path))
    }

    /// Update the output artifact in place after a directive completes
    /// (§4.6 step 6); placeholders for absent metrics resolve to `N/A` via
    /// the template renderer.
    pub fn write_artifact(&self, artifact_path: &Path, artifact: &OutputArtifact, template: &dyn TemplateRenderer) -> Result<(), StoreError> {
        let mut vars = HashMap::new();
        vars.insert("SLUG".to_string(), artifact.slug.clone());
        vars.insert("STATUS".to_string(), artifact.status.to_string());
        vars.insert("PRIORITY".to_string(), artifact.priority.to_string());
        vars.insert("DIRECTIVE_ID".to_string(), artifact.directive_id.to_string());
        vars.insert("RESULT".to_string(), artifact.result.clone());
        vars.insert("NOTES".to_string(), String::new());
        if let Some(v) = artifact.tokens_in {
            vars.insert("TOKENS_IN".to_string(), v.to_string());
        }
        if let Some(v) = artifact.tokens_out {
            vars.insert("TOKENS_OUT".to_string(), v.to_string());
        }
        if let Some(v) = artifact.cost {
            vars.insert("COST".to_string(), format!("${v:.5}"));
        }
        if let Some(v) = artifact.processing_time_ms {
            vars.insert("PROCESSING_TIME".to_string(), format!("{v}ms"));
        }
        let body = template
            .render("directive-out", &vars)
            .unwrap_or_else(|_| format!("# {} — Output\n\nStatus: {}\n\n{}\n", artifact.slug, artifact.status, artifact.result));
        fs::write(artifact_path, body).map_err(|e| StoreError::fs(artifact_path.display().to_string(), e))
    }
}

/// Pull the prompt/task text back out of a rendered `directive-prompt`
/// body (the header never repeats the task text — only the body does).
fn extract_task(body: &str) -> String {
    const MARKER: &str = "## Prompt";
    match body.find(MARKER) {
        Some(idx) => body[idx + MARKER.len()..].trim().to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
