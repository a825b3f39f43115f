use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use mdpress_core::{ConvertOptions, convert_to_html, convert_to_html_sanitized};
use mdpress_renderer::{PdfBackend, PdfMargin, PdfOptions, Renderer, Theme, export_pdf};

struct Config {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    title: Option<String>,
    theme: Theme,
    raw: bool,
    sanitized: bool,
    escape_code: bool,
    pdf: bool,
    pdf_backend: PdfBackend,
    pdf_page: Option<String>,
    pdf_margin: Option<String>,
    pdf_scale: Option<String>,
}

fn main() {
    let mut config = Config {
        input: None,
        output: None,
        out_dir: None,
        title: None,
        theme: Theme::Auto,
        raw: false,
        sanitized: false,
        escape_code: false,
        pdf: false,
        pdf_backend: PdfBackend::Auto,
        pdf_page: None,
        pdf_margin: None,
        pdf_scale: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--raw" => config.raw = true,
            "--sanitized" => config.sanitized = true,
            "--escape-code" => config.escape_code = true,
            "--pdf" => config.pdf = true,
            "--theme" => {
                config.theme = match args.next().as_deref() {
                    Some("auto") => Theme::Auto,
                    Some("light") => Theme::Light,
                    Some("dark") => Theme::Dark,
                    _ => {
                        eprintln!("--theme expects: auto | light | dark");
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            "--title" => match args.next() {
                Some(value) => config.title = Some(value),
                None => {
                    eprintln!("--title expects a value");
                    print_usage();
                    process::exit(2);
                }
            },
            "-o" | "--output" => match args.next() {
                Some(value) => config.output = Some(PathBuf::from(value)),
                None => {
                    eprintln!("--output expects a path");
                    print_usage();
                    process::exit(2);
                }
            },
            "--out-dir" => match args.next() {
                Some(value) => config.out_dir = Some(PathBuf::from(value)),
                None => {
                    eprintln!("--out-dir expects a path");
                    print_usage();
                    process::exit(2);
                }
            },
            "--pdf-backend" => {
                config.pdf_backend = match args.next().as_deref() {
                    Some("auto") => PdfBackend::Auto,
                    Some("chromium") => PdfBackend::Chromium,
                    Some("wkhtmltopdf") => PdfBackend::Wkhtmltopdf,
                    Some("weasyprint") => PdfBackend::Weasyprint,
                    _ => {
                        eprintln!(
                            "--pdf-backend expects: auto | chromium | wkhtmltopdf | weasyprint"
                        );
                        print_usage();
                        process::exit(2);
                    }
                };
            }
            "--pdf-page" => match args.next() {
                Some(value) => config.pdf_page = Some(value),
                None => {
                    eprintln!("--pdf-page expects a size (e.g. A4)");
                    print_usage();
                    process::exit(2);
                }
            },
            "--pdf-margin" => match args.next() {
                Some(value) => config.pdf_margin = Some(value),
                None => {
                    eprintln!("--pdf-margin expects a length (e.g. 2cm)");
                    print_usage();
                    process::exit(2);
                }
            },
            "--pdf-scale" => match args.next() {
                Some(value) => config.pdf_scale = Some(value),
                None => {
                    eprintln!("--pdf-scale expects a factor (e.g. 1.0)");
                    print_usage();
                    process::exit(2);
                }
            },
            _ => {
                if config.input.is_none() {
                    config.input = Some(PathBuf::from(arg));
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let is_batch = config
        .input
        .as_deref()
        .map(Path::is_dir)
        .unwrap_or(false);

    let exit_code = if is_batch {
        convert_tree(&config)
    } else {
        convert_single(&config)
    };
    process::exit(exit_code);
}

fn print_usage() {
    eprintln!(
        "Usage: mdpress [--raw] [--sanitized] [--escape-code] [--theme auto|light|dark]\n\
         \x20              [--title <title>] [-o <path>] [--out-dir <dir>] [--pdf]\n\
         \x20              [--pdf-backend auto|chromium|wkhtmltopdf|weasyprint]\n\
         \x20              [--pdf-page <size>] [--pdf-margin <length>] [--pdf-scale <factor>] [input]\n\
         \n\
         Converts Markdown to styled HTML (or PDF via an external renderer).\n\
         With a file input the result goes to -o or stdout; with a directory\n\
         input every .md file underneath is converted into --out-dir."
    );
}

fn convert_options(config: &Config) -> ConvertOptions {
    ConvertOptions {
        escape_inline_code: config.escape_code,
    }
}

fn convert_body(source: &str, config: &Config) -> String {
    let options = convert_options(config);
    if config.sanitized {
        convert_to_html_sanitized(source, &options)
    } else {
        convert_to_html(source, &options)
    }
}

fn pdf_options(config: &Config) -> PdfOptions {
    let mut options = PdfOptions::new(config.pdf_backend);
    if let Some(page) = &config.pdf_page {
        options = options.with_page(page.clone());
    }
    if let Some(margin) = &config.pdf_margin {
        options = options.with_margin(PdfMargin::uniform(margin.clone()));
    }
    if let Some(scale) = &config.pdf_scale {
        options = options.with_scale(scale.clone());
    }
    options
}

fn convert_single(config: &Config) -> i32 {
    let source = match &config.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("failed to read {}: {}", path.display(), err);
                return 1;
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("failed to read stdin: {}", err);
                return 1;
            }
            buffer
        }
    };

    let title = match &config.title {
        Some(title) => title.clone(),
        None => config
            .input
            .as_deref()
            .map(derive_title)
            .unwrap_or_else(|| "Document".to_string()),
    };

    let body = convert_body(&source, config);
    let renderer = Renderer::new(config.theme);

    if config.pdf {
        let output = match pdf_output_path(config) {
            Ok(path) => path,
            Err(message) => {
                eprintln!("{}", message);
                print_usage();
                return 2;
            }
        };
        if let Err(message) = export_pdf(&renderer, &title, &body, &pdf_options(config), &output) {
            eprintln!("{}", message);
            return 1;
        }
        eprintln!("rendered {}", output.display());
        return 0;
    }

    let html = if config.raw {
        body
    } else {
        renderer.page(&title, &body)
    };

    match &config.output {
        Some(path) => {
            if let Err(err) = fs::write(path, html) {
                eprintln!("failed to write {}: {}", path.display(), err);
                return 1;
            }
            eprintln!("rendered {}", path.display());
        }
        None => print!("{}", html),
    }
    0
}

fn pdf_output_path(config: &Config) -> Result<PathBuf, String> {
    if let Some(path) = &config.output {
        return Ok(path.clone());
    }
    match &config.input {
        Some(input) => Ok(input.with_extension("pdf")),
        None => Err("--pdf with stdin input requires -o <path>".to_string()),
    }
}

fn convert_tree(config: &Config) -> i32 {
    let input_dir = config.input.as_deref().expect("batch mode requires input");
    let out_dir = config
        .out_dir
        .clone()
        .unwrap_or_else(|| input_dir.join("rendered"));

    let mut sources = Vec::new();
    if let Err(err) = collect_markdown(input_dir, &out_dir, &mut sources) {
        eprintln!("failed to scan {}: {}", input_dir.display(), err);
        return 1;
    }
    sources.sort();

    if sources.is_empty() {
        eprintln!("no markdown files found under {}", input_dir.display());
        return 1;
    }

    let renderer = Renderer::new(config.theme);
    let mut converted = 0usize;
    let mut failed = 0usize;

    for source_path in &sources {
        match convert_tree_entry(config, &renderer, input_dir, &out_dir, source_path) {
            Ok(output) => {
                converted += 1;
                eprintln!("rendered {}", output.display());
            }
            Err(message) => {
                failed += 1;
                eprintln!("failed {}: {}", source_path.display(), message);
            }
        }
    }

    eprintln!(
        "converted {} of {} markdown file(s) into {}",
        converted,
        sources.len(),
        out_dir.display()
    );
    if failed > 0 { 1 } else { 0 }
}

fn convert_tree_entry(
    config: &Config,
    renderer: &Renderer,
    input_dir: &Path,
    out_dir: &Path,
    source_path: &Path,
) -> Result<PathBuf, String> {
    let source = fs::read_to_string(source_path).map_err(|err| err.to_string())?;
    let title = config
        .title
        .clone()
        .unwrap_or_else(|| derive_title(source_path));
    let body = convert_body(&source, config);

    let relative = source_path
        .strip_prefix(input_dir)
        .map_err(|err| err.to_string())?;
    let extension = if config.pdf { "pdf" } else { "html" };
    let output = out_dir.join(relative).with_extension(extension);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|err| err.to_string())?;
    }

    if config.pdf {
        export_pdf(renderer, &title, &body, &pdf_options(config), &output)?;
    } else {
        let html = if config.raw {
            body
        } else {
            renderer.page(&title, &body)
        };
        fs::write(&output, html).map_err(|err| err.to_string())?;
    }
    Ok(output)
}

fn collect_markdown(dir: &Path, out_dir: &Path, sources: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path == out_dir {
            // Never reconvert our own output tree.
            continue;
        }
        if path.is_dir() {
            collect_markdown(&path, out_dir, sources)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            sources.push(path);
        }
    }
    Ok(())
}

/// Turns a file stem into a display title: separators become spaces and each
/// word is capitalized, so `design_patterns-guide.md` reads "Design Patterns
/// Guide".
fn derive_title(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Document");
    let mut title = String::new();
    for word in stem.split(['_', '-', ' ']).filter(|word| !word.is_empty()) {
        if !title.is_empty() {
            title.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            title.extend(first.to_uppercase());
            title.push_str(chars.as_str());
        }
    }
    if title.is_empty() {
        "Document".to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::derive_title;
    use std::path::Path;

    #[test]
    fn titles_come_from_file_stems() {
        assert_eq!(
            derive_title(Path::new("docs/design_patterns-guide.md")),
            "Design Patterns Guide"
        );
        assert_eq!(derive_title(Path::new("README.md")), "README");
    }

    #[test]
    fn empty_stem_falls_back() {
        assert_eq!(derive_title(Path::new("___.md")), "Document");
    }
}
