use deployctl_platform::TokenProvider;

pub async fn execute() -> anyhow::Result<()> {
    let token = TokenProvider::from_env().token().await?;
    println!("{}", token);
    Ok(())
}
