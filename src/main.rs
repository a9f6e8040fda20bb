use anyhow::{Context, Result, bail};
use cirrus_query::config::ProfileType;
use cirrus_query::search::{DebugOptions, FallbackRunner, PrefixFilter};
use cirrus_query::utils::get_config_path;
use cirrus_query::{DefaultNamespacePrefixParser, SearchConfig, SearchContext, SearchQuery, SearchQueryBuilder};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cirrus-query")]
#[command(about = "Build, derive and explain wiki search queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the app data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a query is resolved
    Explain {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show the search context built from a query
    Context {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Derive the query sent to a sister wiki
    CrossWiki {
        #[command(flatten)]
        query: QueryArgs,

        /// Config of the sister wiki
        #[arg(short, long)]
        target_config: PathBuf,

        /// Derive a cross-language search instead of a cross-project one
        #[arg(long)]
        language: bool,
    },
    /// Derive a rewritten query, e.g. a spelling suggestion
    Rewrite {
        #[command(flatten)]
        query: QueryArgs,

        /// Replacement query text
        #[arg(long)]
        to: String,
    },
    /// Print the effective config
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Query text
    #[arg(required = true, trailing_var_arg = true)]
    text: Vec<String>,

    /// Namespaces to search (none for all)
    #[arg(short, long = "namespace", value_delimiter = ',')]
    namespaces: Option<Vec<i32>>,

    /// Search every namespace
    #[arg(long, conflicts_with = "namespaces")]
    all_namespaces: bool,

    /// Title prefix filter (e.g. "Help:Con")
    #[arg(long)]
    prefix: Option<String>,

    #[arg(long)]
    offset: Option<usize>,

    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    sort: Option<String>,

    /// Force a profile, as TYPE=NAME (e.g. rescore=classic)
    #[arg(long = "profile", value_parser = parse_forced_profile)]
    profiles: Vec<(ProfileType, String)>,

    /// Profile context parameter, as KEY=VALUE
    #[arg(long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    #[arg(long)]
    no_cross_project: bool,

    #[arg(long)]
    no_cross_language: bool,

    #[arg(long)]
    no_extra_indices: bool,

    #[arg(long)]
    allow_rewrite: bool,

    /// Dump the backend query instead of running it
    #[arg(long)]
    dump_query: bool,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn parse_forced_profile(s: &str) -> std::result::Result<(ProfileType, String), String> {
    let (profile_type, name) = parse_key_value(s)?;
    let profile_type =
        ProfileType::from_name(&profile_type).ok_or_else(|| format!("unknown profile type '{}'", profile_type))?;
    Ok((profile_type, name))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("cirrus_query=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(load_config(cli.config.as_deref())?);
    let ns_parser = DefaultNamespacePrefixParser::new();

    match cli.command {
        Commands::Explain { query } => {
            let query = build_query(&config, &query, &ns_parser)?;
            print_json(&query.explain())?;
        }
        Commands::Context { query } => {
            let query = build_query(&config, &query, &ns_parser)?;
            let fallback_runner = FallbackRunner::create(&query)?;
            let context = SearchContext::from_search_query(&query, Some(fallback_runner))?;
            print_json(&json!({
                "namespaces": context.namespaces(),
                "search_type": context.search_type(),
                "syntax_used": context.syntax_used(),
                "special_keyword_used": context.is_special_keyword_used(),
                "rescore_profile": context.rescore_profile(),
                "fulltext_query_builder_profile": context.fulltext_query_builder_profile(),
                "limit_search_to_local_wiki": context.limit_search_to_local_wiki(),
                "extra_indices": context.extra_indices(),
                "filters": context.filters(),
                "fallbacks": context.fallback_runner().methods(),
            }))?;
        }
        Commands::CrossWiki {
            query,
            target_config,
            language,
        } => {
            let source = build_query(&config, &query, &ns_parser)?;
            let mut target = load_config_file(&target_config)?;
            target.local_wiki = false;
            let target = Arc::new(target);

            let derived = if language {
                SearchQueryBuilder::for_cross_language_search(target, &source)?
            } else {
                SearchQueryBuilder::for_cross_project_search(target, &source)?
            }
            .build();
            print_json(&json!({
                "source": source.explain(),
                "derived": derived.explain(),
            }))?;
        }
        Commands::Rewrite { query, to } => {
            let source = build_query(&config, &query, &ns_parser)?;
            let rewritten = SearchQueryBuilder::for_rewritten_query(&source, &to, &ns_parser)?.build();
            print_json(&json!({
                "source": source.explain(),
                "rewritten": rewritten.explain(),
            }))?;
        }
        Commands::Config { save } => {
            if save {
                config.save().context("Failed to save config")?;
                eprintln!("Saved config to {}", get_config_path()?.display());
            }
            print_json(config.as_ref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    match path {
        Some(path) => load_config_file(path),
        None => SearchConfig::load().context("Failed to load config"),
    }
}

fn load_config_file(path: &Path) -> Result<SearchConfig> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }
    SearchConfig::load_from(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn build_query(config: &Arc<SearchConfig>, args: &QueryArgs, ns_parser: &DefaultNamespacePrefixParser) -> Result<SearchQuery> {
    let text = args.text.join(" ");
    let mut builder = SearchQueryBuilder::new_ft_search_query_builder(Arc::clone(config), &text, ns_parser)
        .with_context(|| format!("Invalid query: {}", text))?;

    if args.all_namespaces {
        builder.set_initial_namespaces(Vec::new());
    } else if let Some(namespaces) = &args.namespaces {
        builder.set_initial_namespaces(namespaces.clone());
    }
    if let Some(prefix) = &args.prefix {
        builder.add_contextual_filter("prefix", Arc::new(PrefixFilter::new(prefix, ns_parser)))?;
    }
    if let Some(offset) = args.offset {
        builder.set_offset(offset);
    }
    if let Some(limit) = args.limit {
        builder.set_limit(limit);
    }
    if let Some(sort) = &args.sort {
        builder.set_sort(sort);
    }
    for (profile_type, name) in &args.profiles {
        builder.add_forced_profile(*profile_type, name);
    }
    for (key, value) in &args.params {
        builder.add_profile_context_parameter(key, value);
    }
    if args.dump_query {
        builder.set_debug_options(DebugOptions {
            dump_query: true,
            ..DebugOptions::default_options()
        });
    }

    builder
        .set_cross_project_search(!args.no_cross_project)
        .set_cross_language_search(!args.no_cross_language)
        .set_extra_indices_search(!args.no_extra_indices)
        .set_allow_rewrite(args.allow_rewrite);

    Ok(builder.build())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
