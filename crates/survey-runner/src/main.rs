fn main() -> anyhow::Result<()> {
    survey_runner::cli::main()
}
