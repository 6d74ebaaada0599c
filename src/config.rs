use envconfig::Envconfig;

#[derive(Envconfig, Debug)]
pub struct Config {
    #[envconfig(from = "MONGODB_URI", default = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    #[envconfig(from = "DATABASE_NAME", default = "pharmacy_store")]
    pub database_name: String,

    #[envconfig(from = "JWT_SECRET", default = "your_jwt_secret_key")]
    pub jwt_secret: String,

    #[envconfig(from = "PORT", default = "5000")]
    pub port: u16,

    #[envconfig(from = "UPLOAD_DIR", default = "uploads")]
    pub upload_dir: String,
}
