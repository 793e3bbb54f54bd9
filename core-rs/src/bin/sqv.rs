//! SQV - SPARQL Query Viz CLI
//!
//! Command-line interface for ontology graph extraction and query sessions

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

use sqv_core::config::resolve_path;
use sqv_core::graph::Layer;
use sqv_core::query::TemplateKind;
use sqv_core::{
    EvaluationOutcome, GraphModel, OxigraphOntology, Session, SessionConfig, SessionOptions,
    SelectionOutcome,
};

#[derive(Parser)]
#[command(name = "sqv")]
#[command(version = "0.4.2")]
#[command(about = "Ontology graph views driven by SPARQL queries", long_about = None)]
struct Cli {
    /// Session file (sqv.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ontology file, used when no session file is given
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,

    /// Ontology IRI, used with --ontology
    #[arg(long, global = true)]
    iri: Option<String>,

    /// Include A-box individuals in the graph
    #[arg(long, global = true)]
    abox: bool,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the ontology graph and print it
    Graph {
        #[arg(long, value_enum, default_value_t = GraphFormat::Summary)]
        format: GraphFormat,
    },
    /// Evaluate one query against the ontology
    Query {
        /// Query text (prefixes are added automatically)
        text: String,
        /// Neighborhood depth around the results
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long, value_enum, default_value_t = ResultFormat::Text)]
        format: ResultFormat,
    },
    /// List discovered templates with slot limits and placeholders
    Templates,
    /// Interactive session, one command per line
    Shell,
}

#[derive(Clone, Copy, ValueEnum)]
enum GraphFormat {
    Summary,
    Json,
    Yaml,
}

#[derive(Clone, Copy, ValueEnum)]
enum ResultFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .init();

    let mut session = open_session(&cli)?;

    match cli.command {
        Commands::Graph { format } => handle_graph(&session, format),
        Commands::Query { text, depth, format } => handle_query(&mut session, &text, depth, format),
        Commands::Templates => handle_templates(&session),
        Commands::Shell => handle_shell(&mut session),
    }
}

fn open_session(cli: &Cli) -> Result<Session<OxigraphOntology>> {
    if let Some(config_path) = &cli.config {
        let config = SessionConfig::load(config_path)
            .with_context(|| format!("loading session file {}", config_path.display()))?;
        let root = config_path.parent().unwrap_or_else(|| Path::new("."));
        let ontology_path = resolve_path(root, &config.spec.ontology.path);

        let store = OxigraphOntology::load(&config.spec.ontology.iri, &ontology_path)?;
        let mut options = SessionOptions::from_config(&config, root)?;
        if cli.abox {
            options.include_instances = true;
        }
        return Ok(Session::open(store, options)?);
    }

    let (Some(path), Some(iri)) = (&cli.ontology, &cli.iri) else {
        return Err(anyhow!("either --config or both --ontology and --iri are required"));
    };
    let store = OxigraphOntology::load(iri, path)?;
    Ok(Session::open(store, SessionOptions::new(cli.abox))?)
}

fn handle_graph(session: &Session<OxigraphOntology>, format: GraphFormat) -> Result<()> {
    let graph = session.full_graph();
    match format {
        GraphFormat::Json => println!("{}", serde_json::to_string_pretty(graph)?),
        GraphFormat::Yaml => print!("{}", serde_yaml::to_string(graph)?),
        GraphFormat::Summary => print_summary(graph),
    }
    Ok(())
}

fn print_summary(graph: &GraphModel) {
    let tbox = graph.nodes.iter().filter(|n| n.layer == Layer::T).count();
    println!("{}", "Graph".green().bold());
    println!("  Nodes: {} ({} T-box, {} A-box)", graph.nodes.len(), tbox, graph.nodes.len() - tbox);
    println!("  Edges: {}", graph.edges.len());
    for node in &graph.nodes {
        println!("  {} {} [{}] importance={}", "•".cyan(), node.id, node.shape, node.importance);
    }
    for edge in &graph.edges {
        println!("  {} {} -> {} ({}, weight={})", "→".cyan(), edge.from, edge.to, edge.label.replace('\n', ""), edge.weight);
    }
}

fn handle_query(
    session: &mut Session<OxigraphOntology>,
    text: &str,
    depth: Option<usize>,
    format: ResultFormat,
) -> Result<()> {
    let evaluation = session.evaluate_text(text, depth);
    match format {
        ResultFormat::Json => {
            let value = serde_json::json!({
                "outcome": evaluation.outcome,
                "resultText": evaluation.result_text,
                "results": evaluation.results,
                "selection": evaluation.selection,
                "displayedNodes": evaluation.displayed.node_ids().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ResultFormat::Text => print_evaluation_text(evaluation.outcome, &evaluation.result_text),
    }
    Ok(())
}

fn print_evaluation_text(outcome: EvaluationOutcome, text: &str) {
    if outcome.is_error() {
        eprintln!("{} {}", "error:".red().bold(), text);
    } else {
        print!("{}", text);
        if !text.ends_with('\n') {
            println!();
        }
    }
}

fn handle_templates(session: &Session<OxigraphOntology>) -> Result<()> {
    if session.templates().is_empty() {
        println!("No templates found.");
        return Ok(());
    }
    for kind in [TemplateKind::Standard, TemplateKind::Inconsistency, TemplateKind::Library] {
        for template in session.templates().of_kind(kind) {
            let limits = session.slots().limits(&template.id).unwrap_or_default();
            println!(
                "{} {:?} nodes={} edges={} placeholders={}",
                template.id.bold(),
                kind,
                limits.max_nodes.map_or("-".to_string(), |n| n.to_string()),
                limits.max_edges.map_or("-".to_string(), |n| n.to_string()),
                template.placeholders()?.join(" ")
            );
        }
    }
    Ok(())
}

enum ShellControl {
    Continue,
    Exit,
}

fn handle_shell(session: &mut Session<OxigraphOntology>) -> Result<()> {
    println!("{}", "SQV shell".green().bold());
    println!("Type `help` for commands. Type `exit` to quit.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", "sqv> ".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match dispatch_shell_line(session, line) {
            Ok(ShellControl::Continue) => {}
            Ok(ShellControl::Exit) => break,
            Err(e) => eprintln!("{} {e}", "error:".red().bold()),
        }
    }
    Ok(())
}

fn dispatch_shell_line(session: &mut Session<OxigraphOntology>, line: &str) -> Result<ShellControl> {
    let (command, arg) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "exit" | "quit" => return Ok(ShellControl::Exit),
        "help" => print_shell_help(),
        "kw" => session.compose_keyword(required(arg, "keyword")?),
        "var" => session.compose_variable(required(arg, "variable")?),
        "sym" => session.compose_symbol(required(arg, "symbol")?),
        "text" => session.compose_free_text(required(arg, "text")?),
        "template" => session.compose_template(required(arg, "template id")?)?,
        "node" => report_selection(session.compose_node_selection(required(arg, "node id")?)?),
        "edge" => report_selection(session.compose_edge_selection(required(arg, "edge id")?)?),
        "undo" => {
            if session.undo_last_input().is_none() {
                println!("Nothing to undo.");
            }
        }
        "clear" => session.clear_query(),
        "show" => {}
        "eval" => {
            let depth = optional_number(arg)?;
            let evaluation = session.evaluate_query(depth);
            print_evaluation_text(evaluation.outcome, &evaluation.result_text);
            println!("  {} nodes displayed", evaluation.displayed.nodes.len());
            return Ok(ShellControl::Continue);
        }
        "depth" => {
            let depth = optional_number(arg)?.ok_or_else(|| anyhow!("depth requires a number"))?;
            match session.set_result_depth(depth) {
                Some(evaluation) => println!("  {} nodes displayed", evaluation.displayed.nodes.len()),
                None => println!("No results to expand."),
            }
            return Ok(ShellControl::Continue);
        }
        "result" => println!("{}", session.result_text()),
        "color-nodes" => print_legend(session.color_nodes_by(required(arg, "attribute")?)?),
        "color-edges" => print_legend(session.color_edges_by(required(arg, "attribute")?)?),
        "size-nodes" => session.size_nodes_by(required(arg, "attribute")?)?,
        "size-edges" => session.size_edges_by(required(arg, "attribute")?)?,
        "style" => session.apply_initial_styling()?,
        "search" => print_summary(&session.search(arg)),
        "graph" => print_summary(&session.displayed_graph()),
        "history" => match optional_number(arg)? {
            Some(n) => print!("{}", session.history_window(n)),
            None => print!("{}", session.recent_history()),
        },
        "clear-history" => session.clear_history(),
        "node-details" => match session.node_details(required(arg, "node id")?)? {
            None => println!("T-box node, no data properties."),
            Some(fragments) if fragments.is_empty() => println!("No data properties for this A-box node."),
            Some(fragments) => fragments.iter().for_each(|f| println!("  {}", f)),
        },
        "edge-details" => {
            for (label, id) in session.edge_details(required(arg, "edge id")?)? {
                println!("  {}: {}", label.bold(), id);
            }
        }
        other => return Err(anyhow!("unknown command `{other}` (try `help`)")),
    }

    if matches!(command, "kw" | "var" | "sym" | "text" | "template" | "node" | "edge" | "undo" | "clear" | "show") {
        println!("{}", session.query_text().dimmed());
    }
    Ok(ShellControl::Continue)
}

fn required<'a>(arg: &'a str, what: &str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(anyhow!("missing {what}"))
    } else {
        Ok(arg)
    }
}

fn optional_number(arg: &str) -> Result<Option<usize>> {
    if arg.is_empty() {
        return Ok(None);
    }
    arg.parse()
        .map(Some)
        .with_context(|| format!("`{arg}` is not a number"))
}

fn report_selection(outcome: SelectionOutcome) {
    match outcome {
        SelectionOutcome::Substituted { placeholder } => println!("  filled {}", placeholder),
        SelectionOutcome::Appended => println!("  appended"),
        SelectionOutcome::Ignored => println!("  template slots are full, selection ignored"),
    }
}

fn print_legend(legend: &sqv_core::Legend) {
    for entry in &legend.entries {
        println!("  {} {}", entry.color, entry.value);
    }
}

fn print_shell_help() {
    println!("{}", "Query".bold());
    println!("  kw <KEYWORD> | var <?v> | sym <symbol> | text <free text>");
    println!("  template <id> | node <node id> | edge <edge id>");
    println!("  undo | clear | show");
    println!("  eval [depth] | depth <n> | result");
    println!("{}", "View".bold());
    println!("  color-nodes <attr|None> | color-edges <attr|None>");
    println!("  size-nodes <attr|None> | size-edges <attr|None> | style");
    println!("  search <text> | graph | node-details <id> | edge-details <id>");
    println!("{}", "History".bold());
    println!("  history [n] | clear-history");
}
