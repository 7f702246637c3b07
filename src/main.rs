fn main() {
    if let Err(err) = sales_profiler::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
