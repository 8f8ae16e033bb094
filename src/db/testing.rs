// src/db/testing.rs
//
// Banco descartável para os testes que exercitam o SQL de verdade.
// Cada teste cria o seu próprio database (com as migrações aplicadas) a partir
// de DATABASE_URL; sem a variável, o teste avisa e não roda.

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    Connection, Executor, PgConnection, PgPool,
};
use std::str::FromStr;
use uuid::Uuid;

pub struct TestDb {
    pub pool: PgPool,
    server: PgConnectOptions,
    name: String,
}

impl TestDb {
    pub async fn create() -> Option<Self> {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL não definida: teste com Postgres ignorado");
            return None;
        };

        let server = PgConnectOptions::from_str(&url).expect("DATABASE_URL inválida");
        let name = format!("sicro_test_{}", Uuid::new_v4().simple());

        let mut conn = PgConnection::connect_with(&server)
            .await
            .expect("falha ao conectar no Postgres de teste");
        conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
            .await
            .expect("falha ao criar o database de teste");
        conn.close().await.ok();

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(server.clone().database(&name))
            .await
            .expect("falha ao conectar no database de teste");

        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("falha ao aplicar as migrações");

        Some(Self { pool, server, name })
    }

    /// Fecha o pool e apaga o database. Se o teste falhar antes, o database fica para inspeção.
    pub async fn drop_database(self) {
        self.pool.close().await;

        if let Ok(mut conn) = PgConnection::connect_with(&self.server).await {
            let _ = conn
                .execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, self.name).as_str())
                .await;
            conn.close().await.ok();
        }
    }
}
