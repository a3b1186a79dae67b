//! Integrity diagnostics for documents.
//!
//! Reports structural issues (dangling edges, duplicate ids) in a loaded or
//! pasted document. `repair_document` applies the fixes the graph store
//! relies on before accepting a document wholesale.

use crate::id::{EdgeId, NodeId};
use crate::model::Document;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Violates a store invariant; repaired on load.
    Warning,
    /// Allowed, but probably unintended.
    Info,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSubject {
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    pub subject: LintSubject,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-edge").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all rules and return diagnostics. Does not modify the document.
#[must_use]
pub fn lint_document(doc: &Document) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_nodes(doc, &mut diags);
    lint_duplicate_edges(doc, &mut diags);
    lint_dangling_edges(doc, &mut diags);
    lint_self_loops(doc, &mut diags);
    diags
}

/// Drop duplicate nodes/edges (first occurrence wins) and edges whose
/// endpoints are missing. Returns the diagnostics for what was removed.
pub fn repair_document(doc: &mut Document) -> Vec<LintDiagnostic> {
    let diags: Vec<LintDiagnostic> = lint_document(doc)
        .into_iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .collect();
    if diags.is_empty() {
        return diags;
    }

    let mut seen_nodes = HashSet::new();
    doc.nodes.retain(|n| seen_nodes.insert(n.id));

    let mut seen_edges = HashSet::new();
    doc.edges.retain(|e| {
        seen_nodes.contains(&e.source) && seen_nodes.contains(&e.target) && seen_edges.insert(e.id)
    });

    for d in &diags {
        log::warn!("repaired document: {} ({})", d.message, d.rule);
    }
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_duplicate_nodes(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for node in &doc.nodes {
        if !seen.insert(node.id) {
            diags.push(LintDiagnostic {
                subject: LintSubject::Node(node.id),
                message: format!("Card id `{}` appears more than once.", node.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-node-id",
            });
        }
    }
}

fn lint_duplicate_edges(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for edge in &doc.edges {
        if !seen.insert(edge.id) {
            diags.push(LintDiagnostic {
                subject: LintSubject::Edge(edge.id),
                message: format!("Edge id `{}` appears more than once.", edge.id),
                severity: LintSeverity::Warning,
                rule: "duplicate-edge-id",
            });
        }
    }
}

fn lint_dangling_edges(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let ids: HashSet<NodeId> = doc.nodes.iter().map(|n| n.id).collect();
    for edge in &doc.edges {
        for endpoint in [edge.source, edge.target] {
            if !ids.contains(&endpoint) {
                diags.push(LintDiagnostic {
                    subject: LintSubject::Edge(edge.id),
                    message: format!("Edge `{}` references missing card `{endpoint}`.", edge.id),
                    severity: LintSeverity::Warning,
                    rule: "dangling-edge",
                });
            }
        }
    }
}

fn lint_self_loops(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    for edge in doc.edges.iter().filter(|e| e.source == e.target) {
        diags.push(LintDiagnostic {
            subject: LintSubject::Edge(edge.id),
            message: format!("Edge `{}` connects card `{}` to itself.", edge.id, edge.source),
            severity: LintSeverity::Info,
            rule: "self-loop",
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
