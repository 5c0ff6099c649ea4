use sqlx::PgPool;

/// Connect, migrate, verify the status lookup table matches the core enum.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    autocheck_db::health_check(&pool).await.unwrap();

    let rows: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM analysis_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();

    let expected = [
        autocheck_core::analysis::AnalysisStatus::Created,
        autocheck_core::analysis::AnalysisStatus::ImagesUploaded,
        autocheck_core::analysis::AnalysisStatus::Scored,
    ];
    assert_eq!(rows.len(), expected.len());
    for ((id, name), status) in rows.iter().zip(expected) {
        assert_eq!(*id, status.id());
        assert_eq!(name, status.as_str());
    }
}
