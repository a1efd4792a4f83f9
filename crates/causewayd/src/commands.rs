use std::io::Write;

use anyhow::{Context, Result};
use causeway_analysis::{CausalEngine, CrisisSubgraphRequest, ImportanceRequest, PathRequest};
use causeway_core::GraphSnapshot;
use serde::Serialize;

use crate::cli::{Cli, Commands, CrisisArgs, PathsArgs, RankArgs, optional_list};
use crate::snapshot::load_snapshot;

const SUMMARY_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub schema_version: String,
    pub content_version: String,
    pub node_count: u32,
    pub mechanism_count: u32,
    pub malformed_mechanisms: u32,
    pub dangling_mechanisms: u32,
    pub crisis_nodes: u32,
    pub policy_levers: u32,
}

/// Runs one command and writes its JSON result to `out`.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let engine = CausalEngine::open(&cli.workspace).with_context(|| {
        format!(
            "failed to load workspace config under {}",
            cli.workspace.display()
        )
    })?;
    let snapshot = load_snapshot(&cli.snapshot)?;

    match &cli.command {
        Commands::Paths(args) => run_paths_command(&engine, &snapshot, args, out),
        Commands::Crisis(args) => run_crisis_command(&engine, &snapshot, args, out),
        Commands::Rank(args) => run_rank_command(&engine, &snapshot, args, out),
        Commands::Summary => run_summary_command(&engine, &snapshot, out),
    }
}

pub fn run_paths_command<W: Write>(
    engine: &CausalEngine,
    snapshot: &GraphSnapshot,
    args: &PathsArgs,
    out: &mut W,
) -> Result<()> {
    let result = engine
        .find_paths(
            snapshot,
            &PathRequest {
                from_node: args.from.clone(),
                to_node: args.to.clone(),
                algorithm: args.algorithm,
                max_depth: args.max_depth,
                max_paths: args.max_paths,
                categories: optional_list(&args.categories),
            },
        )
        .context("pathfinding failed")?;
    write_json(out, &result)
}

pub fn run_crisis_command<W: Write>(
    engine: &CausalEngine,
    snapshot: &GraphSnapshot,
    args: &CrisisArgs,
    out: &mut W,
) -> Result<()> {
    let result = engine
        .crisis_subgraph(
            snapshot,
            &CrisisSubgraphRequest {
                crisis_node_ids: args.nodes.clone(),
                max_degrees: args.max_degrees,
                min_strength: args.min_strength,
                categories: optional_list(&args.categories),
            },
        )
        .context("crisis subgraph extraction failed")?;
    write_json(out, &result)
}

pub fn run_rank_command<W: Write>(
    engine: &CausalEngine,
    snapshot: &GraphSnapshot,
    args: &RankArgs,
    out: &mut W,
) -> Result<()> {
    let result = engine
        .rank_nodes(
            snapshot,
            &ImportanceRequest {
                top_n: args.top_n,
                categories: optional_list(&args.categories),
                scales: optional_list(&args.scales),
                min_connections: args.min_connections,
            },
        )
        .context("importance ranking failed")?;
    write_json(out, &result)
}

pub fn run_summary_command<W: Write>(
    engine: &CausalEngine,
    snapshot: &GraphSnapshot,
    out: &mut W,
) -> Result<()> {
    let lookup = engine
        .graph(snapshot)
        .context("failed to resolve graph snapshot")?;
    let graph = &lookup.graph;
    let summary = GraphSummary {
        schema_version: SUMMARY_SCHEMA_VERSION.to_owned(),
        content_version: lookup.content_version.clone(),
        node_count: graph.node_count() as u32,
        mechanism_count: graph.mechanism_count() as u32,
        malformed_mechanisms: graph.malformed_mechanism_count() as u32,
        dangling_mechanisms: graph.dangling_mechanism_count() as u32,
        crisis_nodes: graph.nodes().filter(|node| node.is_crisis()).count() as u32,
        policy_levers: graph.nodes().filter(|node| node.is_policy_lever()).count() as u32,
    };
    write_json(out, &summary)
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize JSON output")?;
    writeln!(out).context("failed to write trailing newline")?;
    Ok(())
}
