use std::process::ExitCode;

fn main() -> ExitCode {
    match markdown_toc_cli::run() {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("markdown-toc: {err:#}");
            ExitCode::from(markdown_toc_cli::exit_code_for(&err))
        }
    }
}
