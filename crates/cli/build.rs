use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("billboard")
        .version("1.0.0")
        .author("billboard-charts contributors")
        .about("Fetch music charts from billboard.com")
        .arg(clap::arg!([CHART] "Chart name, e.g. hot-100 or billboard-200").default_value("hot-100"))
        .arg(clap::arg!(-d --date <DATE> "Chart week in YYYY-MM-DD format (default: current week)"))
        .arg(
            clap::arg!(-i --input <FILE> "Parse a saved HTML page instead of fetching, or '-' for stdin")
                .value_name("FILE")
                .value_hint(clap::ValueHint::FilePath),
        )
        .arg(clap::arg!(-l --list "List available charts instead of fetching one"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                .value_name("FORMAT")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(clap::arg!(-n --limit <N> "Only print the first N songs"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout per attempt in seconds").default_value("30"))
        .arg(clap::arg!(--retries <NUM> "Retries for transient network failures").default_value("3"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "billboard", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "billboard", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "billboard", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "billboard", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
