use clap::Parser;
use greeter::app::Application;
use greeter::greeting;
use greeter::middleware::RequestLogger;

/// A minimal greeting REST service.
#[derive(Parser, Debug)]
struct Cli {
    /// Address the server will bind
    #[clap(short, long, default_value = "127.0.0.1")]
    address: String,

    /// Port the server will listen on
    #[clap(short, long, default_value = "8081")]
    port: u16,

    /// Cap on concurrently served connections
    #[clap(long, default_value = "256")]
    max_connections: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let mut app = Application::new();
    app.max_connections(cli.max_connections);
    app.middleware(RequestLogger);
    greeting::register(&mut app);

    app.listen(&format!("{}:{}", cli.address, cli.port))
}
