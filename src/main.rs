fn main() {
    if let Err(err) = critical_parts::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
