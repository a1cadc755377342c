fn main() {
    if let Err(e) = semscope_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
