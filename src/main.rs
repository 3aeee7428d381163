fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    payment_diagnostics_lib::run()
}
