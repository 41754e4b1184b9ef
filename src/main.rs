fn main() {
    if let Err(err) = csv_explorer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
