// src/services/payroll_sweep.rs

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::{
    common::clock::Clock,
    services::{payroll::PayrollPolicy, worker_service::WorkerService},
};

/// Dispara a passada diária da folha na hora de corte local.
pub fn spawn(service: WorkerService, policy: PayrollPolicy, clock: Arc<dyn Clock>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = policy
                .until_next_sweep(clock.now())
                .to_std()
                .unwrap_or(Duration::from_secs(60));

            tracing::info!("⏰ Próxima atualização da folha em {} min", wait.as_secs() / 60);
            tokio::time::sleep(wait).await;

            match service.sweep().await {
                Ok((ok, 0)) => tracing::info!("✅ Folha atualizada: {} trabalhadores", ok),
                Ok((ok, failed)) => tracing::warn!(
                    "⚠️ Folha atualizada com falhas: {} ok, {} com erro",
                    ok,
                    failed
                ),
                Err(e) => tracing::error!("🔥 Falha na atualização diária da folha: {:?}", e),
            }
        }
    })
}
