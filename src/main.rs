fn main() {
    if let Err(err) = prazo_diag::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
