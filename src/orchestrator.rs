//! Validation orchestrator
//!
//! Sequences the pipeline over a document set: per-document gating
//! (version, profile, naming), capability closure, token resolution,
//! component/matrix/data validation, and finally the rule engine over
//! the assembled model. Diagnostics accumulate in one report; only
//! structural failures exclude a document, nothing aborts the run.
//!
//! A run is a pure function of the document set. Interactive callers
//! pass a cancellation flag; a cancelled run returns
//! [`ValidationOutcome::Cancelled`] and its partial diagnostics are
//! dropped, never merged with a newer run.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::cache::{ContentHash, TokenGraphCache};
use crate::capability::{Capability, CapabilitySet};
use crate::component::{validate_component, Component};
use crate::data::resolve_data;
use crate::diagnostics::{rule, DiagnosticReport};
use crate::document::{is_valid_entity_name, Document, DocumentKind};
use crate::matrix::evaluate_matrix;
use crate::model::{Flow, Navigation, ResolvedModel, Screen};
use crate::profile::{resolve_profile, CheckCategory, Profile, ProfileTable};
use crate::rules::{evaluate, parse_rules, Rule};
use crate::tokens::{merge_theme_layers, TokenGraph};
use crate::version::{gate, GateVerdict};

/// Run-level defaults, applied per document only when the document
/// omits the field. No process-wide implicit state.
#[derive(Debug, Clone, Default)]
pub struct ResolutionConfig {
    pub default_profile: Profile,
    pub default_capabilities: CapabilitySet,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct ValidationRun {
    pub report: DiagnosticReport,
    pub model: ResolvedModel,
}

impl ValidationRun {
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}

/// Outcome of [`Orchestrator::validate`]
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    Completed(Box<ValidationRun>),
    /// The cancellation flag was raised mid-run; partial results are
    /// discarded
    Cancelled,
}

impl ValidationOutcome {
    pub fn completed(self) -> Option<ValidationRun> {
        match self {
            ValidationOutcome::Completed(run) => Some(*run),
            ValidationOutcome::Cancelled => None,
        }
    }
}

/// A gated document with its resolved profile table
struct GatedDocument {
    document: Document,
    table: ProfileTable,
}

/// Drives validation runs, holding the cross-run token cache.
#[derive(Debug, Default)]
pub struct Orchestrator {
    config: ResolutionConfig,
    cache: TokenGraphCache,
}

impl Orchestrator {
    pub fn new(config: ResolutionConfig) -> Self {
        Self {
            config,
            cache: TokenGraphCache::new(),
        }
    }

    /// Validate a document set.
    ///
    /// The `cancel` flag is checked between stages; once raised, the
    /// run stops and reports nothing.
    pub fn validate(&mut self, documents: Vec<Document>, cancel: &AtomicBool) -> ValidationOutcome {
        let mut report = DiagnosticReport::new();

        // Stage 1: per-document gates. Independent across documents.
        let mut accepted: Vec<GatedDocument> = Vec::new();
        for document in documents {
            let path = document.diag_path();
            let verdict = gate(&document.dcf_version, &path, &mut report);
            if verdict == GateVerdict::Rejected {
                continue;
            }

            let profile = resolve_profile(document.profile.as_deref(), self.config.default_profile);
            let table = ProfileTable::for_profile(profile);

            check_document_name(&document, &table, &mut report);
            accepted.push(GatedDocument { document, table });
        }

        if cancel.load(Ordering::SeqCst) {
            return ValidationOutcome::Cancelled;
        }

        // Stage 2: capability closure over the union of every declaring
        // document; a layer is on when any document enables it. With no
        // declaration anywhere the run default applies.
        let capabilities =
            resolve_capabilities(&accepted, &self.config.default_capabilities, &mut report);

        if cancel.load(Ordering::SeqCst) {
            return ValidationOutcome::Cancelled;
        }

        // Stage 3: token resolution. Single serialization point; the
        // graph is frozen once built.
        let tokens = self.resolve_tokens(&accepted, &mut report);

        if cancel.load(Ordering::SeqCst) {
            return ValidationOutcome::Cancelled;
        }

        let mut model = ResolvedModel {
            tokens,
            capabilities: capabilities.clone(),
            ..ResolvedModel::default()
        };

        // Stage 4: components, variant matrices, screens, flows,
        // navigation. Independent per entity.
        let mut rules: Vec<Rule> = Vec::new();
        for gated in &accepted {
            let document = &gated.document;
            let path = document.diag_path();
            match document.kind {
                DocumentKind::Component => {
                    self.validate_component_doc(gated, &model.tokens, &mut report, &mut model.components)
                }
                DocumentKind::Screen => match Screen::from_body(&path, &document.body) {
                    Ok(screen) => {
                        resolve_data(&path, &screen.data, &screen.content, &mut report);
                        model.screens.insert(path.clone(), screen);
                    }
                    Err(e) => report_malformed_body(&gated.table, &mut report, &path, &e),
                },
                DocumentKind::Flow => match Flow::from_body(&path, &document.body) {
                    Ok(flow) => {
                        resolve_data(&path, &flow.data, &flow.steps, &mut report);
                        model.flows.insert(path.clone(), flow);
                    }
                    Err(e) => report_malformed_body(&gated.table, &mut report, &path, &e),
                },
                DocumentKind::Navigation => match Navigation::from_body(&path, &document.body) {
                    Ok(nav) => {
                        model.navigations.insert(path.clone(), nav);
                    }
                    Err(e) => report_malformed_body(&gated.table, &mut report, &path, &e),
                },
                DocumentKind::Rules => {
                    rules.extend(parse_rules(&document.body, &path, &mut report));
                }
                // Token and theme documents were consumed in stage 3;
                // layout and i18n bodies have no semantic checks here.
                _ => {}
            }
        }

        check_cross_references(&model, &capabilities, &mut report);

        if cancel.load(Ordering::SeqCst) {
            return ValidationOutcome::Cancelled;
        }

        // Stage 5: global rules over the frozen model, always last.
        evaluate(&rules, &model, &mut report);

        report.capabilities = capabilities;
        ValidationOutcome::Completed(Box::new(ValidationRun { report, model }))
    }

    fn validate_component_doc(
        &self,
        gated: &GatedDocument,
        tokens: &TokenGraph,
        report: &mut DiagnosticReport,
        components: &mut BTreeMap<String, Component>,
    ) {
        let path = gated.document.diag_path();
        match Component::from_body(&path, &gated.document.body) {
            Ok(component) => {
                validate_component(&component, tokens, &gated.table, report);
                let coverage = evaluate_matrix(
                    &component.name,
                    &component.variants,
                    component.variant_matrix.as_ref(),
                    &gated.table,
                    report,
                );
                report
                    .variant_coverage
                    .insert(component.name.clone(), coverage);
                components.insert(path, component);
            }
            Err(e) => report_malformed_body(&gated.table, report, &path, &e),
        }
    }

    /// Merge theme layers, then build the token graph, consulting the
    /// content-addressed cache first.
    ///
    /// The graph spans every contributing document, so undefined-token
    /// strictness follows the strictest profile any of them declared.
    fn resolve_tokens(
        &mut self,
        accepted: &[GatedDocument],
        report: &mut DiagnosticReport,
    ) -> TokenGraph {
        let mut token_tree = Value::Object(serde_json::Map::new());
        let mut layers = serde_json::Map::new();
        let mut merge_order: Option<Vec<String>> = None;
        let mut profile: Option<Profile> = None;
        let mut hashes: Vec<ContentHash> = Vec::new();

        for gated in accepted {
            let document = &gated.document;
            match document.kind {
                DocumentKind::Tokens => {
                    crate::tokens::merge::deep_merge(&mut token_tree, &document.body);
                    profile = Some(match profile {
                        Some(p) => p.max(gated.table.profile),
                        None => gated.table.profile,
                    });
                    hashes.push(hash_document(document));
                }
                DocumentKind::Theme | DocumentKind::Theming => {
                    if let Some(declared) = document.body.get("layers").and_then(Value::as_object) {
                        for (name, tree) in declared {
                            match layers.get_mut(name) {
                                Some(existing) => {
                                    crate::tokens::merge::deep_merge(existing, tree)
                                }
                                None => {
                                    layers.insert(name.clone(), tree.clone());
                                }
                            }
                        }
                    }
                    if let Some(order) = document.body.get("merge_order").and_then(Value::as_array)
                    {
                        merge_order = Some(
                            order
                                .iter()
                                .filter_map(Value::as_str)
                                .map(String::from)
                                .collect(),
                        );
                    }
                    profile = Some(match profile {
                        Some(p) => p.max(gated.table.profile),
                        None => gated.table.profile,
                    });
                    hashes.push(hash_document(document));
                }
                _ => {}
            }
        }

        // Absent a declared merge_order, layer names apply in sorted
        // order for determinism.
        let order = merge_order
            .unwrap_or_else(|| layers.keys().cloned().collect());

        let table =
            ProfileTable::for_profile(profile.unwrap_or(self.config.default_profile));
        hashes.push(ContentHash::from_content(table.profile.as_str()));
        let key = ContentHash::combine(&hashes);

        if let Some(hit) = self.cache.get(&key) {
            for diagnostic in &hit.diagnostics {
                report.diagnostics.push(diagnostic.clone());
            }
            return hit.graph.clone();
        }

        let theme = merge_theme_layers(&layers, &order);
        let mut token_report = DiagnosticReport::new();
        let graph = TokenGraph::build(&token_tree, &theme, &table, &mut token_report);

        report.diagnostics.extend(token_report.diagnostics.clone());
        self.cache
            .insert(key, graph.clone(), token_report.diagnostics);
        graph
    }
}

/// Union the `capabilities` maps of every document that declares one as
/// an object, then close once over the dependency table. `true` wins on
/// conflicting declarations (adoption is additive); a non-mapping
/// `capabilities` value declares nothing.
fn resolve_capabilities(
    accepted: &[GatedDocument],
    default: &CapabilitySet,
    report: &mut DiagnosticReport,
) -> CapabilitySet {
    let mut declared: BTreeMap<Capability, bool> = BTreeMap::new();
    let mut declaring_path: Option<String> = None;

    for gated in accepted {
        let Some(map) = gated
            .document
            .body
            .get("capabilities")
            .and_then(Value::as_object)
        else {
            continue;
        };
        declaring_path.get_or_insert_with(|| gated.document.diag_path());
        for (key, value) in map {
            let (Some(cap), Some(on)) = (Capability::parse(key), value.as_bool()) else {
                continue;
            };
            declared
                .entry(cap)
                .and_modify(|existing| *existing = *existing || on)
                .or_insert(on);
        }
    }

    match declaring_path {
        Some(path) => CapabilitySet::from_declared(&declared, &path, report),
        None => default.clone(),
    }
}

fn hash_document(document: &Document) -> ContentHash {
    let canonical =
        serde_json::to_string(&document.body).unwrap_or_else(|_| document.source_id.clone());
    ContentHash::from_content(&format!("{}:{}", document.source_id, canonical))
}

fn check_document_name(document: &Document, table: &ProfileTable, report: &mut DiagnosticReport) {
    if !document.kind.requires_name() {
        return;
    }
    match &document.name {
        None => {
            table.report(
                CheckCategory::MissingRequired,
                report,
                &document.source_id,
                rule::MISSING_REQUIRED,
                format!("{} documents require a 'name'", document.kind),
            );
        }
        Some(name) if !is_valid_entity_name(name) => {
            report.error(
                &document.source_id,
                rule::INVALID_NAME,
                format!("name '{name}' must match ^[A-Z][a-zA-Z0-9]*$"),
            );
        }
        Some(_) => {}
    }
}

/// Composition references across entities. Disabled capability layers
/// suppress findings about their missing artifacts, never findings
/// about content that is present.
fn check_cross_references(
    model: &ResolvedModel,
    capabilities: &CapabilitySet,
    report: &mut DiagnosticReport,
) {
    if capabilities.is_enabled(Capability::Components) {
        for screen in model.screens.values() {
            check_component_refs(&screen.content, &screen.name, model, report);
        }
    }

    if capabilities.is_enabled(Capability::Screens) {
        for nav in model.navigations.values() {
            for (route_id, route) in &nav.routes {
                if let Some(screen) = &route.screen {
                    if !model.screens.contains_key(screen) {
                        report.error(
                            &format!("{}.routes.{route_id}", nav.name),
                            rule::UNRESOLVED_BINDING,
                            format!("route references unknown screen '{screen}'"),
                        );
                    }
                }
                for target in &route.transitions {
                    if !nav.routes.contains_key(target) {
                        report.error(
                            &format!("{}.routes.{route_id}", nav.name),
                            rule::UNRESOLVED_BINDING,
                            format!("transition targets unknown route '{target}'"),
                        );
                    }
                }
            }
        }
    }
}

fn check_component_refs(
    tree: &Value,
    owner: &str,
    model: &ResolvedModel,
    report: &mut DiagnosticReport,
) {
    match tree {
        Value::Object(map) => {
            if let Some(name) = map.get("component").and_then(Value::as_str) {
                if !model.components.contains_key(name) {
                    report.error(
                        owner,
                        rule::UNRESOLVED_BINDING,
                        format!("content references unknown component '{name}'"),
                    );
                }
            }
            for value in map.values() {
                check_component_refs(value, owner, model, report);
            }
        }
        Value::Array(items) => {
            for item in items {
                check_component_refs(item, owner, model, report);
            }
        }
        _ => {}
    }
}

fn report_malformed_body(
    table: &ProfileTable,
    report: &mut DiagnosticReport,
    path: &str,
    error: &serde_json::Error,
) {
    table.report(
        CheckCategory::MissingRequired,
        report,
        path,
        rule::MISSING_REQUIRED,
        format!("document body does not match its schema: {error}"),
    );
}
