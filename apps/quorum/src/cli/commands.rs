//! # CLI Command Implementations
//!
//! File loading, the `cmd_*` entry points, and text/JSON rendering of
//! query results.

use crate::config::Config;
use quorum_core::{
    Classification, EntryId, ExtendedClause, KnowledgeMap, Projection, Query, QueryResult,
    QuorumError, Reference, ReferenceLayers, Rule, SharedProperties,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

// =============================================================================
// INPUT FILES
// =============================================================================

/// Maximum size of a fact or rule file (100 MB).
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Lines starting with this are comments.
const COMMENT_PREFIX: char = '#';

/// Resolve an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, QuorumError> {
    let canonical = path.canonicalize().map_err(|e| {
        QuorumError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(QuorumError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), QuorumError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| QuorumError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(QuorumError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String, QuorumError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_INPUT_FILE_SIZE)?;
    std::fs::read_to_string(&validated)
        .map_err(|e| QuorumError::IoError(format!("Read file '{}': {}", path.display(), e)))
}

/// Non-blank, non-comment lines with their 1-based line numbers.
pub fn statement_lines(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
}

/// Assert every statement in `text`. Returns how many were new.
pub fn load_facts_from_str(kmap: &mut KnowledgeMap, text: &str) -> Result<usize, QuorumError> {
    let mut added = 0;
    for (line_no, line) in statement_lines(text) {
        let result = kmap.add_statement(line).inspect_err(|e| {
            tracing::error!("Rejected fact on line {}: {}", line_no, e);
        })?;
        if result.is_some() {
            added += 1;
        }
    }
    Ok(added)
}

/// Teach every rule in `text`. Returns how many were read.
pub fn load_rules_from_str(kmap: &mut KnowledgeMap, text: &str) -> Result<usize, QuorumError> {
    let mut count = 0;
    for (line_no, line) in statement_lines(text) {
        let rule: Rule = line.parse().inspect_err(|e| {
            tracing::error!("Rejected rule on line {}: {}", line_no, e);
        })?;
        kmap.teach(rule);
        count += 1;
    }
    Ok(count)
}

/// Build a knowledge map from the configured mode and the input files.
pub fn load_knowledge_map(
    config: &Config,
    facts: &[PathBuf],
    rules: &[PathBuf],
) -> Result<KnowledgeMap, QuorumError> {
    let mut kmap = config.knowledge_map();

    for path in facts {
        tracing::info!("Loading facts from {:?}", path);
        let added = load_facts_from_str(&mut kmap, &read_input(path)?)?;
        tracing::info!("Loaded {} new facts from {:?}", added, path);
    }

    for path in rules {
        tracing::info!("Loading rules from {:?}", path);
        let count = load_rules_from_str(&mut kmap, &read_input(path)?)?;
        tracing::info!("Loaded {} rules from {:?}", count, path);
    }

    Ok(kmap)
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

pub fn facts_json(facts: &[(EntryId, ExtendedClause)]) -> Value {
    let items: Vec<Value> = facts
        .iter()
        .map(|(id, ec)| json!({ "id": id.0, "fact": ec.to_string() }))
        .collect();
    json!({ "count": facts.len(), "facts": items })
}

pub fn references_json(references: &BTreeSet<Reference>) -> Value {
    json!({ "count": references.len(), "references": references })
}

pub fn layers_json(layers: &ReferenceLayers) -> Value {
    let map: serde_json::Map<String, Value> = layers
        .iter()
        .map(|(depth, layer)| (depth.to_string(), json!(layer)))
        .collect();
    json!({ "layers": map })
}

pub fn classification_json(classification: &Classification) -> Value {
    let scores: Vec<Value> = classification
        .ranked()
        .into_iter()
        .map(|((relation, node), score)| {
            let feature = (relation.clone(), node.clone());
            json!({
                "relation": relation,
                "node": node,
                "score": score,
                "matches": classification.matches.get(&feature).copied().unwrap_or(0),
                "non_exclusive": classification.non_exclusive.get(&feature).copied().unwrap_or(0),
            })
        })
        .collect();

    json!({
        "class": classification.class,
        "members": classification.members,
        "scores": scores,
    })
}

pub fn shared_json(shared: &SharedProperties) -> Value {
    let map: serde_json::Map<String, Value> = shared
        .iter()
        .map(|(projection, values)| (projection.to_string(), json!(values)))
        .collect();
    Value::Object(map)
}

/// JSON form of any query result.
pub fn result_json(result: &QueryResult) -> Value {
    match result {
        QueryResult::Facts(facts) => facts_json(facts),
        QueryResult::References(references) => references_json(references),
        QueryResult::Layers(layers) => layers_json(layers),
        QueryResult::Classification(classification) => classification_json(classification),
        QueryResult::Shared(shared) => shared_json(shared),
    }
}

fn join_references(references: &BTreeSet<Reference>) -> String {
    references
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_text(result: &QueryResult) {
    match result {
        QueryResult::Facts(facts) => {
            println!("{} matching facts", facts.len());
            for (id, ec) in facts {
                println!("  {}  {}", id, ec);
            }
        }
        QueryResult::References(references) => {
            println!("{} references", references.len());
            for reference in references {
                println!("  {}", reference);
            }
        }
        QueryResult::Layers(layers) => {
            for (depth, layer) in layers {
                println!("Depth {} ({} entries): {}", depth, layer.len(), join_references(layer));
            }
        }
        QueryResult::Classification(c) => {
            let members: Vec<&str> = c.members.iter().map(String::as_str).collect();
            println!("Class: {}", c.class);
            println!("Members ({}): {}", members.len(), members.join(", "));
            println!();
            if c.scores.is_empty() {
                println!("No distinguishing features");
            }
            for ((relation, node), score) in c.ranked() {
                println!("  {}  {} {}", score, relation, node);
            }
        }
        QueryResult::Shared(shared) => {
            for (projection, values) in shared {
                println!("{:<16} {}", projection.to_string(), join_references(values));
            }
        }
    }
}

/// Run a query and print its result.
fn run(kmap: &KnowledgeMap, json_mode: bool, query: &Query) -> Result<(), QuorumError> {
    tracing::debug!("Executing {:?}", query);
    let result = kmap.execute(query)?;

    if json_mode {
        print_json(&result_json(&result));
    } else {
        print_text(&result);
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store statistics.
pub fn cmd_status(kmap: &KnowledgeMap, config: &Config, json_mode: bool) -> Result<(), QuorumError> {
    let keys: Vec<&str> = kmap.store().qualifier_keys().collect();

    if json_mode {
        let output = json!({
            "facts": kmap.store().len(),
            "symbols": kmap.symbols().len(),
            "relations": kmap.relations().iter().collect::<Vec<_>>(),
            "qualifier_keys": keys,
            "rules": kmap.patterns().len(),
            "qualifier_mode": config.store.qualifier_mode,
        });
        print_json(&output);
        return Ok(());
    }

    println!("Quorum Store Status");
    println!("===================");
    println!("Qualifier Mode: {:?}", config.store.qualifier_mode);
    println!();
    println!("Facts:          {}", kmap.store().len());
    println!("Symbols:        {}", kmap.symbols().len());
    println!("Relations:      {}", kmap.relations().len());
    println!("Qualifier Keys: {}", keys.join(", "));
    println!("Rules:          {}", kmap.patterns().len());

    Ok(())
}

// =============================================================================
// QUERY COMMANDS
// =============================================================================

/// Match a pattern with optional qualifiers.
pub fn cmd_query(kmap: &KnowledgeMap, json_mode: bool, pattern: &str) -> Result<(), QuorumError> {
    run(kmap, json_mode, &Query::get(pattern)?)
}

pub fn cmd_references(
    kmap: &KnowledgeMap,
    config: &Config,
    json_mode: bool,
    root: &str,
    depth: usize,
    attr: &str,
) -> Result<(), QuorumError> {
    config.check_depth(depth)?;
    let projection: Projection = attr.parse()?;
    run(kmap, json_mode, &Query::references(root, depth, projection))
}

/// Layers `0..depth`; the deepest computed layer is `depth - 1`.
pub fn cmd_layers(
    kmap: &KnowledgeMap,
    config: &Config,
    json_mode: bool,
    root: &str,
    depth: usize,
) -> Result<(), QuorumError> {
    config.check_depth(depth.saturating_sub(1))?;
    let query = Query::Layers {
        root: root.to_string(),
        depth,
    };
    run(kmap, json_mode, &query)
}

pub fn cmd_classify(
    kmap: &KnowledgeMap,
    config: &Config,
    json_mode: bool,
    class: &str,
    template: Option<&str>,
) -> Result<(), QuorumError> {
    let template = match template {
        Some(text) => text.parse()?,
        None => config.class_template()?,
    };
    let query = Query::Classify {
        class: class.to_string(),
        template,
    };
    run(kmap, json_mode, &query)
}

pub fn cmd_intersect(
    kmap: &KnowledgeMap,
    config: &Config,
    json_mode: bool,
    a: &str,
    b: &str,
    depth: usize,
    attr: &str,
) -> Result<(), QuorumError> {
    config.check_depth(depth)?;
    let query = Query::Intersect {
        a: a.to_string(),
        b: b.to_string(),
        depth,
        projection: attr.parse()?,
    };
    run(kmap, json_mode, &query)
}

pub fn cmd_shared(
    kmap: &KnowledgeMap,
    config: &Config,
    json_mode: bool,
    a: &str,
    b: &str,
    depth: usize,
) -> Result<(), QuorumError> {
    config.check_depth(depth)?;
    let query = Query::Shared {
        a: a.to_string(),
        b: b.to_string(),
        depth,
    };
    run(kmap, json_mode, &query)
}

pub fn cmd_compare(
    kmap: &KnowledgeMap,
    config: &Config,
    json_mode: bool,
    a: &str,
    others: Vec<String>,
    depth: usize,
) -> Result<(), QuorumError> {
    config.check_depth(depth)?;
    run(kmap, json_mode, &Query::compare(a, others, depth))
}

// =============================================================================
// INFER COMMAND
// =============================================================================

/// Run up to `passes` inference passes. Returns every new fact in order.
pub fn run_inference(
    kmap: &mut KnowledgeMap,
    passes: usize,
) -> Result<Vec<ExtendedClause>, QuorumError> {
    let mut inferred = Vec::new();

    for pass in 1..=passes {
        let added = kmap.infer()?;
        tracing::info!("Inference pass {} added {} facts", pass, added.len());
        for ec in &added {
            tracing::debug!("Inferred: {}", ec);
        }
        if added.is_empty() {
            break;
        }
        inferred.extend(added);
    }

    Ok(inferred)
}

/// Run inference and print the new facts as statements.
pub fn cmd_infer(kmap: &mut KnowledgeMap, json_mode: bool, passes: usize) -> Result<(), QuorumError> {
    let inferred = run_inference(kmap, passes)?;

    if json_mode {
        let facts: Vec<String> = inferred.iter().map(ToString::to_string).collect();
        print_json(&json!({
            "count": facts.len(),
            "total_facts": kmap.store().len(),
            "inferred": facts,
        }));
        return Ok(());
    }

    for ec in &inferred {
        println!("{}", ec);
    }
    tracing::info!("Inferred {} facts in total", inferred.len());
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
