fn main() {
    witness::cli::run();
}
