fn main() -> anyhow::Result<()> {
    letterdesk::cli::run()
}
