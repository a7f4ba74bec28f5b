//! cssmig CLI - CSS class audit and interactive rename for web codebases.
//!
//! Subcommands:
//! - `audit`: declaration model, usage counts, risk, components, duplicates
//! - `rename`: interactive in-place class rename with backups
//! - `deprecated`: forwarding stylesheet for renamed classes
//! - `tokens`: design-token usage report and token rewrite
//! - `inspect`: what the usage scanner sees in one file

mod prompt;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use cssmig_core::report::{print_rewrite_summary, print_token_summary, write_json};
use cssmig_core::rewrite::{
    install_token_sheet, rewrite_token_files, AcceptAll, DEFAULT_BACKUP_SUFFIX,
};
use cssmig_core::scan::{CSS_EXTENSIONS, SOURCE_EXTENSIONS};
use cssmig_core::{
    defined_tokens, display_path, gather_files, init_logging, inspect_source, load_audit_declarations,
    load_config, print_audit_summary, read_source, render_deprecated_css, write_audit_outputs,
    CssAudit, CssmigConfig, Heuristics, OutputFormat, RenameMapping, RewriteOptions, Rewriter,
    TokenReport, TokenUsage,
};

use prompt::TerminalPrompt;

const DEFAULT_OUTPUT_DIR: &str = "css-audit/output";
const DEFAULT_DEPRECATED_CSS: &str = "styles/deprecated-classes.css";
const DEFAULT_TOKEN_REPORT: &str = "css-audit/tokens/usage-report.json";
const DEFAULT_TOKEN_SHEET: &str = "styles/tokens.css";

#[derive(Parser, Debug)]
#[command(author, version, about = "CSS class audit and rename toolkit")]
pub struct Cli {
    /// Directory holding cssmig.toml
    #[arg(long, global = true, default_value = ".")]
    config: PathBuf,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the class audit from stylesheets and markup/script sources
    Audit {
        /// Stylesheet files or directories
        #[arg(long, num_args = 1.., required = true)]
        css: Vec<PathBuf>,

        /// HTML/JS/TS files or directories
        #[arg(long, num_args = 1..)]
        src: Vec<PathBuf>,

        /// Directory for the JSON and CSV artifacts
        #[arg(long)]
        output: Option<String>,

        /// Print the console summary as JSON
        #[arg(long)]
        json: bool,

        /// Source files to log at debug level
        #[arg(long, default_value_t = cssmig_core::audit::DEFAULT_SAMPLE_SIZE)]
        sample: usize,
    },

    /// Rename classes in place, asking per occurrence
    Rename {
        /// Directories or files to scan
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// JSON file with an {"old": "new"} mapping
        #[arg(long, value_name = "FILE")]
        map: Option<PathBuf>,

        /// Extra mapping entry; overrides the map file
        #[arg(long = "pair", value_name = "OLD:NEW")]
        pairs: Vec<String>,

        /// Report what would change; exit 1 if anything would
        #[arg(long)]
        dry_run: bool,

        /// Accept every occurrence without asking
        #[arg(long)]
        all_yes: bool,

        /// Do not write backup copies beside modified files
        #[arg(long)]
        no_backup: bool,
    },

    /// Generate a stylesheet keeping renamed classes working
    Deprecated {
        /// JSON file with the rename mapping
        #[arg(long, value_name = "FILE")]
        mapping: PathBuf,

        /// Audit JSON produced by `cssmig audit`
        #[arg(long, value_name = "FILE")]
        audit: PathBuf,

        /// Output stylesheet path
        #[arg(long, default_value = DEFAULT_DEPRECATED_CSS)]
        output: String,
    },

    /// Analyze design-token usage and optionally migrate references
    Tokens {
        /// Stylesheet defining the tokens in :root
        #[arg(long, value_name = "FILE")]
        tokens_css: PathBuf,

        /// Stylesheets to analyze/update
        #[arg(long, num_args = 1..)]
        css: Vec<PathBuf>,

        /// Scripts to analyze/update
        #[arg(long, num_args = 1..)]
        js: Vec<PathBuf>,

        /// Only write the report, never touch files
        #[arg(long)]
        analyze_only: bool,

        /// Which files to rewrite
        #[arg(long, value_enum, default_value_t = UpdateTarget::All)]
        update: UpdateTarget,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Path for the JSON usage report
        #[arg(long, default_value = DEFAULT_TOKEN_REPORT)]
        report: String,

        /// Print a unified diff of each rewritten file
        #[arg(long)]
        show_diff: bool,

        /// Replacement token sheet to install at --output-tokens
        #[arg(long, value_name = "FILE")]
        rationalized_tokens: Option<PathBuf>,

        /// Where the replacement token sheet is written
        #[arg(long, default_value = DEFAULT_TOKEN_SHEET)]
        output_tokens: String,
    },

    /// Show what the usage scanner sees in one file
    Inspect {
        file: PathBuf,

        /// Number of preview lines
        #[arg(long, default_value_t = cssmig_core::audit::PREVIEW_LINES)]
        lines: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UpdateTarget {
    Css,
    Js,
    All,
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    for component in p.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(anyhow!(
                "Path traversal (..) not allowed in output paths: {}",
                path
            ));
        }
    }

    Ok(p)
}

/// Validated output path, or exit 2 like any other unusable argument.
fn output_path_or_exit(path: &str) -> PathBuf {
    match validate_output_path(path) {
        Ok(safe_path) => safe_path,
        Err(e) => {
            eprintln!("[ERROR] Invalid output path: {}", e);
            std::process::exit(2);
        }
    }
}

/// Console format: `--json` wins, then `[output] format`, then plain.
fn summary_format(json: bool, config: Option<&CssmigConfig>) -> OutputFormat {
    if json {
        return OutputFormat::Json;
    }
    let configured = config
        .and_then(|c| c.output.as_ref())
        .and_then(|o| o.format.as_deref());
    match configured.map(str::parse::<OutputFormat>) {
        Some(Ok(format)) => format,
        Some(Err(e)) => {
            eprintln!("[WARN] {}; using plain output", e);
            OutputFormat::Plain
        }
        None => OutputFormat::Plain,
    }
}

fn backup_suffix(config: Option<&CssmigConfig>) -> String {
    config
        .and_then(|c| c.backup_suffix.clone())
        .unwrap_or_else(|| DEFAULT_BACKUP_SUFFIX.to_string())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] cssmig internal error: {}", info);
        eprintln!("[PANIC] Files already written keep their backups; the rest were not touched.");
    }));

    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from: {}", cli.config.display()))?;
    let heuristics = Heuristics::from_config(config.as_ref());
    let excludes = config.as_ref().map(CssmigConfig::excludes).unwrap_or_default();

    match cli.command {
        Command::Audit {
            css,
            src,
            output,
            json,
            sample,
        } => {
            // 1. Output location (flag, then config, then default)
            let output = output
                .or_else(|| config.as_ref()?.output.as_ref()?.dir.clone())
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
            let dir = output_path_or_exit(&output);

            // 2. Analyze
            let report = CssAudit::new()
                .css_files(css)
                .source_files(src)
                .exclude_dirs(excludes)
                .heuristics(heuristics)
                .sample_size(sample)
                .run()?;

            // 3. Persist artifacts and summarize
            write_audit_outputs(&report, &dir)?;
            let format = summary_format(json, config.as_ref());
            print_audit_summary(&report, format);
            if format == OutputFormat::Plain {
                println!("Output saved to {}/", dir.display());
            }
        }

        Command::Rename {
            roots,
            map,
            pairs,
            dry_run,
            all_yes,
            no_backup,
        } => {
            // Mapping problems are fatal before any file is read.
            let mapping = RenameMapping::from_sources(map.as_deref(), &pairs)?;
            let files = gather_files(&roots, SOURCE_EXTENSIONS, &excludes)?;
            let options = RewriteOptions {
                dry_run,
                backup: !no_backup,
                backup_suffix: backup_suffix(config.as_ref()),
            };

            let summary = if all_yes || dry_run {
                Rewriter::new(&mapping, options, AcceptAll).run(&files)?
            } else {
                let prompt = TerminalPrompt::new();
                if !prompt.is_interactive() {
                    bail!("Interactive rename needs a terminal; use --all-yes or --dry-run");
                }
                Rewriter::new(&mapping, options, prompt).run(&files)?
            };

            print_rewrite_summary(&summary);
            std::process::exit(if summary.dry_run && summary.would_change() { 1 } else { 0 });
        }

        Command::Deprecated {
            mapping,
            audit,
            output,
        } => {
            let output = output_path_or_exit(&output);
            let mapping = RenameMapping::from_sources(Some(mapping.as_path()), &[])?;
            let index = load_audit_declarations(&audit)?;
            let css = render_deprecated_css(mapping.iter(), &index);

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&output, css)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Deprecated classes CSS file generated: {}", output.display());
        }

        Command::Tokens {
            tokens_css,
            css,
            js,
            analyze_only,
            update,
            dry_run,
            report,
            show_diff,
            rationalized_tokens,
            output_tokens,
        } => {
            let report_path = output_path_or_exit(&report);
            let output_tokens = output_path_or_exit(&output_tokens);
            run_tokens(TokensArgs {
                tokens_css: &tokens_css,
                css: &css,
                js: &js,
                analyze_only,
                update,
                dry_run,
                show_diff,
                rationalized_tokens: rationalized_tokens.as_deref(),
                output_tokens: &output_tokens,
                report_path: &report_path,
                heuristics: &heuristics,
                excludes: &excludes,
                backup_suffix: backup_suffix(config.as_ref()),
            })?;
        }

        Command::Inspect { file, lines } => {
            let text = read_source(&file)?;
            let inspection = inspect_source(&display_path(&file), &text, lines);

            println!("=== {} ===", file.display());
            for line in &inspection.preview_lines {
                println!("  | {}", line);
            }
            println!("CLASSES ({}):", inspection.classes.len());
            for class in &inspection.classes {
                println!("- {}", class);
            }
            if !inspection.advisory.is_empty() {
                println!("POSSIBLE DYNAMIC REFERENCES ({}, not counted):", inspection.advisory.len());
                for literal in &inspection.advisory {
                    println!("- {}", literal);
                }
            }
        }
    }

    Ok(())
}

struct TokensArgs<'a> {
    tokens_css: &'a Path,
    css: &'a [PathBuf],
    js: &'a [PathBuf],
    analyze_only: bool,
    update: UpdateTarget,
    dry_run: bool,
    show_diff: bool,
    rationalized_tokens: Option<&'a Path>,
    output_tokens: &'a Path,
    report_path: &'a Path,
    heuristics: &'a Heuristics,
    excludes: &'a [String],
    backup_suffix: String,
}

fn run_tokens(args: TokensArgs<'_>) -> Result<()> {
    if args.css.is_empty() && args.js.is_empty() {
        bail!("No files specified for analysis. Use --css and/or --js.");
    }

    // 1. Tokens defined in :root
    let defined = defined_tokens(&read_source(args.tokens_css)?);

    // 2. Usage across every file
    let css_files = if args.css.is_empty() {
        Vec::new()
    } else {
        gather_files(args.css, CSS_EXTENSIONS, args.excludes)?
    };
    let js_files = if args.js.is_empty() {
        Vec::new()
    } else {
        gather_files(args.js, SOURCE_EXTENSIONS, args.excludes)?
    };
    println!(
        "Analyzing token usage in {} files...",
        css_files.len() + js_files.len()
    );

    let mut usage = TokenUsage::new();
    for path in css_files.iter().chain(&js_files) {
        match read_source(path) {
            Ok(text) => usage.record_file(&display_path(path), &text),
            Err(e) => eprintln!("[WARN] Skipping {}: {}", path.display(), e),
        }
    }

    // 3. Report
    let report = TokenReport::build(&usage, &defined, &args.heuristics.tokens);
    write_json(args.report_path, &report)?;
    print_token_summary(&report, defined.len());
    println!("Token usage report generated: {}", args.report_path.display());

    let options = RewriteOptions {
        dry_run: args.dry_run,
        backup: true,
        backup_suffix: args.backup_suffix,
    };

    // 4. Replacement token sheet
    if let Some(sheet) = args.rationalized_tokens {
        install_token_sheet(sheet, args.output_tokens, args.analyze_only, &options)?;
    }

    if args.analyze_only {
        println!("Analysis complete. No files were modified (--analyze-only).");
        return Ok(());
    }

    // 5. Rewrite
    let targets: Vec<PathBuf> = match args.update {
        UpdateTarget::Css => css_files,
        UpdateTarget::Js => js_files,
        UpdateTarget::All => css_files.into_iter().chain(js_files).collect(),
    };
    let summary = rewrite_token_files(&targets, &args.heuristics.tokens, &options, args.show_diff)?;
    println!(
        "Token update complete. Updated {} out of {} files.",
        summary.updated.len(),
        targets.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    // --- validate_output_path TESTS ---

    #[test]
    fn test_validate_output_path_accepts_relative() {
        let p = validate_output_path("css-audit/output").unwrap();
        assert_eq!(p, PathBuf::from("css-audit/output"));
    }

    #[test]
    fn test_validate_output_path_rejects_absolute() {
        let abs = if cfg!(windows) { "C:\\out" } else { "/tmp/out" };
        assert!(validate_output_path(abs).is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        assert!(validate_output_path("../out").is_err());
        assert!(validate_output_path("a/../../b").is_err());
    }

    #[test]
    fn test_validate_output_path_rejects_null_bytes() {
        assert!(validate_output_path("out\0.json").is_err());
    }

    // --- argument parsing TESTS ---

    #[test]
    fn test_parse_audit() {
        let cli = Cli::try_parse_from([
            "cssmig", "audit", "--css", "a.css", "b.css", "--src", "src", "--json",
        ])
        .unwrap();
        match cli.command {
            Command::Audit { css, src, json, output, .. } => {
                assert_eq!(css, vec![PathBuf::from("a.css"), PathBuf::from("b.css")]);
                assert_eq!(src, vec![PathBuf::from("src")]);
                assert!(json);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rename_with_pairs() {
        let cli = Cli::try_parse_from([
            "cssmig", "rename", "src", "lib", "--pair", "btn:button", "--pair", "x:y",
            "--dry-run", "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);
        match cli.command {
            Command::Rename { roots, pairs, dry_run, all_yes, no_backup, map } => {
                assert_eq!(roots.len(), 2);
                assert_eq!(pairs, vec!["btn:button", "x:y"]);
                assert!(dry_run);
                assert!(!all_yes && !no_backup);
                assert!(map.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rename_requires_roots() {
        assert!(Cli::try_parse_from(["cssmig", "rename", "--pair", "a:b"]).is_err());
    }

    #[test]
    fn test_parse_tokens_defaults() {
        let cli = Cli::try_parse_from([
            "cssmig", "tokens", "--tokens-css", "tokens.css", "--css", "a.css", "--update", "css",
        ])
        .unwrap();
        match cli.command {
            Command::Tokens {
                update,
                report,
                analyze_only,
                show_diff,
                rationalized_tokens,
                output_tokens,
                ..
            } => {
                assert_eq!(update, UpdateTarget::Css);
                assert_eq!(report, DEFAULT_TOKEN_REPORT);
                assert!(!analyze_only);
                assert!(!show_diff);
                assert!(rationalized_tokens.is_none());
                assert_eq!(output_tokens, DEFAULT_TOKEN_SHEET);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tokens_sheet_and_diff() {
        let cli = Cli::try_parse_from([
            "cssmig",
            "tokens",
            "--tokens-css",
            "t.css",
            "--css",
            "a.css",
            "--rationalized-tokens",
            "new.css",
            "--output-tokens",
            "theme/tokens.css",
            "--show-diff",
        ])
        .unwrap();
        match cli.command {
            Command::Tokens {
                show_diff,
                rationalized_tokens,
                output_tokens,
                ..
            } => {
                assert!(show_diff);
                assert_eq!(rationalized_tokens, Some(PathBuf::from("new.css")));
                assert_eq!(output_tokens, "theme/tokens.css");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    // --- config-derived settings TESTS ---

    #[test]
    fn test_summary_format_precedence() {
        let config: CssmigConfig = toml_config("[output]\nformat = \"json\"\n");
        assert_eq!(summary_format(false, Some(&config)), OutputFormat::Json);
        assert_eq!(summary_format(true, None), OutputFormat::Json);
        assert_eq!(summary_format(false, None), OutputFormat::Plain);

        let bad: CssmigConfig = toml_config("[output]\nformat = \"xml\"\n");
        assert_eq!(summary_format(false, Some(&bad)), OutputFormat::Plain);
    }

    #[test]
    fn test_backup_suffix_from_config() {
        let config: CssmigConfig = toml_config("backup_suffix = \".orig\"\n");
        assert_eq!(backup_suffix(Some(&config)), ".orig");
        assert_eq!(backup_suffix(None), DEFAULT_BACKUP_SUFFIX);
    }

    fn toml_config(text: &str) -> CssmigConfig {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir()
            .join("cssmig_cli_test")
            .join(format!("{}_{}", std::process::id(), id));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(cssmig_core::CONFIG_FILE), text).unwrap();
        let config = load_config(&dir).unwrap().unwrap();
        let _ = fs::remove_dir_all(&dir);
        config
    }
}
