//! Catalog query layer: the read-only source of tools and use cases.
//!
//! Three sources implement `CatalogQuery`: the SQLite `Store`, the HTTP
//! `ApiClient`, and `StaticCatalog` (built-in or TOML data). `FallbackCatalog`
//! puts a primary source in front of the static set and switches over, once,
//! the first time the primary fails.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, instrument, warn};

use crate::domain::{sort_use_cases, CatalogOrigin, Tool, ToolCategory, UseCase};
use crate::error::AppError;
use crate::seeds::{builtin_tools, builtin_use_cases};

pub trait CatalogQuery: Send + Sync {
  fn list_tools(&self) -> impl Future<Output = Result<Vec<Tool>, AppError>> + Send;

  /// Ordered by difficulty rank, then title.
  fn list_use_cases(&self) -> impl Future<Output = Result<Vec<UseCase>, AppError>> + Send;

  fn get_use_case(&self, id: &str) -> impl Future<Output = Result<Option<UseCase>, AppError>> + Send;
}

/// In-memory catalog with the same shape as the store.
#[derive(Clone, Debug)]
pub struct StaticCatalog {
  tools: Vec<Tool>,
  use_cases: Vec<UseCase>,
}

impl StaticCatalog {
  pub fn new(tools: Vec<Tool>, mut use_cases: Vec<UseCase>) -> Self {
    sort_use_cases(&mut use_cases);
    Self { tools, use_cases }
  }

  pub fn builtin() -> Self {
    Self::new(builtin_tools(), builtin_use_cases())
  }

  pub fn tools(&self) -> &[Tool] {
    &self.tools
  }

  pub fn use_cases(&self) -> &[UseCase] {
    &self.use_cases
  }

  pub fn find_use_case(&self, id: &str) -> Option<UseCase> {
    self.use_cases.iter().find(|u| u.id == id).cloned()
  }
}

impl CatalogQuery for StaticCatalog {
  async fn list_tools(&self) -> Result<Vec<Tool>, AppError> {
    Ok(self.tools.clone())
  }

  async fn list_use_cases(&self) -> Result<Vec<UseCase>, AppError> {
    Ok(self.use_cases.clone())
  }

  async fn get_use_case(&self, id: &str) -> Result<Option<UseCase>, AppError> {
    Ok(self.find_use_case(id))
  }
}

/// Primary source with a one-way switch to static data on the first failure.
pub struct FallbackCatalog<P> {
  primary: Option<P>,
  fallback: StaticCatalog,
  degraded: AtomicBool,
}

impl<P: CatalogQuery> FallbackCatalog<P> {
  pub fn new(primary: Option<P>, fallback: StaticCatalog) -> Self {
    let degraded = AtomicBool::new(primary.is_none());
    Self { primary, fallback, degraded }
  }

  pub fn primary(&self) -> Option<&P> {
    self.primary.as_ref()
  }

  pub fn into_primary(self) -> Option<P> {
    self.primary
  }

  pub fn is_degraded(&self) -> bool {
    self.degraded.load(Ordering::Acquire)
  }

  /// Route reads back to the primary after a successful connectivity probe.
  pub fn recover(&self) {
    if self.primary.is_some() && self.degraded.swap(false, Ordering::AcqRel) {
      info!(target: "catalog", "Primary catalog reachable again; leaving fallback mode");
    }
  }

  fn live_primary(&self) -> Option<&P> {
    if self.is_degraded() {
      None
    } else {
      self.primary.as_ref()
    }
  }

  fn degrade(&self, op: &str, e: &AppError) {
    if !self.degraded.swap(true, Ordering::AcqRel) {
      warn!(target: "catalog", %op, error = %e, "Catalog unavailable; serving static fallback data");
    }
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn list_tools(&self) -> (Vec<Tool>, CatalogOrigin) {
    if let Some(p) = self.live_primary() {
      match p.list_tools().await {
        Ok(tools) => return (tools, CatalogOrigin::Store),
        Err(e) => self.degrade("list_tools", &e),
      }
    }
    (self.fallback.tools.clone(), CatalogOrigin::Fallback)
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn list_use_cases(&self) -> (Vec<UseCase>, CatalogOrigin) {
    if let Some(p) = self.live_primary() {
      match p.list_use_cases().await {
        Ok(ucs) => return (ucs, CatalogOrigin::Store),
        Err(e) => self.degrade("list_use_cases", &e),
      }
    }
    (self.fallback.use_cases.clone(), CatalogOrigin::Fallback)
  }

  /// `None` means the use case does not exist in whichever source answered.
  #[instrument(level = "debug", skip(self), fields(%id))]
  pub async fn get_use_case(&self, id: &str) -> (Option<UseCase>, CatalogOrigin) {
    if let Some(p) = self.live_primary() {
      match p.get_use_case(id).await {
        Ok(uc) => return (uc, CatalogOrigin::Store),
        Err(e) => self.degrade("get_use_case", &e),
      }
    }
    (self.fallback.find_use_case(id), CatalogOrigin::Fallback)
  }
}

/// Showcase filter: optional category plus a case-insensitive search over
/// name, description and capabilities.
pub fn filter_tools(tools: &[Tool], category: Option<ToolCategory>, query: Option<&str>) -> Vec<Tool> {
  let needle = query
    .map(|q| q.trim().to_lowercase())
    .filter(|q| !q.is_empty());

  tools
    .iter()
    .filter(|t| category.map_or(true, |c| t.category == c))
    .filter(|t| match &needle {
      None => true,
      Some(q) => {
        t.name.to_lowercase().contains(q)
          || t.description.to_lowercase().contains(q)
          || t.capabilities.iter().any(|c| c.to_lowercase().contains(q))
      }
    })
    .cloned()
    .collect()
}

/// Data problems found at load time. None of them stop the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogIssue {
  DuplicateToolId(String),
  DuplicateUseCaseId(String),
  /// The use case can never be solved perfectly.
  RequiredNotInSolution { use_case: String, tool: String },
  DanglingToolRef { use_case: String, tool: String },
}

impl fmt::Display for CatalogIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CatalogIssue::DuplicateToolId(id) => write!(f, "duplicate tool id '{}'", id),
      CatalogIssue::DuplicateUseCaseId(id) => write!(f, "duplicate use case id '{}'", id),
      CatalogIssue::RequiredNotInSolution { use_case, tool } => {
        write!(f, "use case '{}' requires '{}' but its solution omits it", use_case, tool)
      }
      CatalogIssue::DanglingToolRef { use_case, tool } => {
        write!(f, "use case '{}' references unknown tool '{}'", use_case, tool)
      }
    }
  }
}

pub fn validate_catalog(tools: &[Tool], use_cases: &[UseCase]) -> Vec<CatalogIssue> {
  let mut issues = vec![];

  let mut tool_ids = HashSet::new();
  for t in tools {
    if !tool_ids.insert(t.id.as_str()) {
      issues.push(CatalogIssue::DuplicateToolId(t.id.clone()));
    }
  }

  let mut uc_ids = HashSet::new();
  for uc in use_cases {
    if !uc_ids.insert(uc.id.as_str()) {
      issues.push(CatalogIssue::DuplicateUseCaseId(uc.id.clone()));
    }

    for req in &uc.required_tools {
      if !uc.solution.contains(req) {
        issues.push(CatalogIssue::RequiredNotInSolution {
          use_case: uc.id.clone(),
          tool: req.clone(),
        });
      }
    }

    let mut seen = HashSet::new();
    let refs = uc
      .required_tools
      .iter()
      .chain(&uc.optional_tools)
      .chain(&uc.solution);
    for tool in refs {
      if !tool_ids.contains(tool.as_str()) && seen.insert(tool.as_str()) {
        issues.push(CatalogIssue::DanglingToolRef {
          use_case: uc.id.clone(),
          tool: tool.clone(),
        });
      }
    }
  }

  issues
}

/// Validate and log; returns the number of issues found.
pub fn report_catalog_issues(tools: &[Tool], use_cases: &[UseCase], origin: CatalogOrigin) -> usize {
  let issues = validate_catalog(tools, use_cases);
  for issue in &issues {
    warn!(target: "catalog", origin = origin.as_str(), %issue, "Catalog data issue");
  }
  info!(target: "aipuzzle_backend", origin = origin.as_str(), tools = tools.len(), use_cases = use_cases.len(), issues = issues.len(), "Catalog inventory");
  issues.len()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::AtomicUsize;

  /// Primary that fails every call and counts how often it was asked.
  #[derive(Default)]
  struct Unreachable {
    calls: AtomicUsize,
  }

  impl CatalogQuery for Unreachable {
    async fn list_tools(&self) -> Result<Vec<Tool>, AppError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Err(AppError::CatalogUnavailable("connection refused".into()))
    }

    async fn list_use_cases(&self) -> Result<Vec<UseCase>, AppError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Err(AppError::CatalogUnavailable("connection refused".into()))
    }

    async fn get_use_case(&self, _id: &str) -> Result<Option<UseCase>, AppError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Err(AppError::CatalogUnavailable("connection refused".into()))
    }
  }

  fn tiny_primary() -> StaticCatalog {
    let mut tools = builtin_tools();
    tools.truncate(2);
    StaticCatalog::new(tools, vec![])
  }

  #[tokio::test]
  async fn healthy_primary_answers() {
    let cat = FallbackCatalog::new(Some(tiny_primary()), StaticCatalog::builtin());
    let (tools, origin) = cat.list_tools().await;
    assert_eq!(origin, CatalogOrigin::Store);
    assert_eq!(tools.len(), 2);

    let (uc, origin) = cat.get_use_case("chatbot").await;
    assert_eq!(origin, CatalogOrigin::Store);
    assert!(uc.is_none());
    assert!(!cat.is_degraded());
  }

  #[tokio::test]
  async fn first_failure_switches_to_fallback_for_good() {
    let cat = FallbackCatalog::new(Some(Unreachable::default()), StaticCatalog::builtin());

    let (tools, origin) = cat.list_tools().await;
    assert_eq!(origin, CatalogOrigin::Fallback);
    assert_eq!(tools.len(), builtin_tools().len());
    assert!(cat.is_degraded());

    let (uc, origin) = cat.get_use_case("chatbot").await;
    assert_eq!(origin, CatalogOrigin::Fallback);
    assert_eq!(uc.unwrap().id, "chatbot");

    let _ = cat.list_use_cases().await;
    assert_eq!(cat.primary().unwrap().calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn recover_retries_primary() {
    let cat = FallbackCatalog::new(Some(Unreachable::default()), StaticCatalog::builtin());
    let _ = cat.list_tools().await;
    cat.recover();
    assert!(!cat.is_degraded());
    let _ = cat.list_tools().await;
    assert_eq!(cat.primary().unwrap().calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn no_primary_means_fallback_from_the_start() {
    let cat: FallbackCatalog<StaticCatalog> = FallbackCatalog::new(None, StaticCatalog::builtin());
    assert!(cat.is_degraded());
    let (ucs, origin) = cat.list_use_cases().await;
    assert_eq!(origin, CatalogOrigin::Fallback);
    assert_eq!(ucs[0].id, "text-summarization");
    cat.recover();
    assert!(cat.is_degraded());
  }

  #[test]
  fn static_use_cases_are_sorted() {
    let cat = StaticCatalog::builtin();
    let order: Vec<&str> = cat.use_cases().iter().map(|u| u.id.as_str()).collect();
    assert_eq!(
      order,
      vec![
        "text-summarization",
        "image-generator",
        "sentiment-analysis",
        "code-assistant",
        "chatbot",
        "object-detection",
      ]
    );
  }

  #[test]
  fn filter_by_category_and_query() {
    let tools = builtin_tools();
    let models = filter_tools(&tools, Some(ToolCategory::Model), None);
    assert_eq!(models.len(), 4);

    let image = filter_tools(&tools, Some(ToolCategory::Model), Some("IMAGE"));
    let ids: Vec<&str> = image.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["dalle", "stable-diffusion"]);

    let by_capability = filter_tools(&tools, None, Some("stemming"));
    assert_eq!(by_capability[0].id, "nltk");

    assert_eq!(filter_tools(&tools, None, Some("   ")).len(), tools.len());
  }

  #[test]
  fn builtin_catalog_is_clean() {
    assert!(validate_catalog(&builtin_tools(), &builtin_use_cases()).is_empty());
  }

  #[test]
  fn validation_flags_unsolvable_and_dangling_entries() {
    let tools = builtin_tools();
    let mut ucs = builtin_use_cases();
    ucs[0].required_tools.push("keras".into());
    ucs[1].optional_tools.push("ghost".into());
    ucs[1].solution.push("ghost".into());
    ucs[2].id = ucs[0].id.clone();

    let issues = validate_catalog(&tools, &ucs);
    assert!(issues.contains(&CatalogIssue::RequiredNotInSolution {
      use_case: "text-summarization".into(),
      tool: "keras".into(),
    }));
    assert!(issues.contains(&CatalogIssue::DanglingToolRef {
      use_case: "image-generator".into(),
      tool: "ghost".into(),
    }));
    assert!(issues.contains(&CatalogIssue::DuplicateUseCaseId("text-summarization".into())));
    // "ghost" appears twice on one use case but is reported once.
    assert_eq!(
      issues.iter().filter(|i| matches!(i, CatalogIssue::DanglingToolRef { .. })).count(),
      1
    );
  }
}
