use std::path::Path;

use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};
use drp_core::{Catalog, CatalogSource, PipelineError};
use drp_domain::{FilterId, PatchId, RaftId, RepoHandle, TractId, VisitId};
use drp_persistence::{PersistenceError, RepoCatalogSource, SqliteRegistry};

/// Registro mínimo con filas duplicadas y desordenadas.
fn seed_registry(path: &Path) {
    let mut conn = SqliteConnection::establish(&path.display().to_string()).unwrap();
    conn.batch_execute("CREATE TABLE raw (id INTEGER PRIMARY KEY, visit BIGINT NOT NULL, raft TEXT NOT NULL);
         CREATE TABLE raw_visit (visit BIGINT NOT NULL, filter TEXT NOT NULL);
         INSERT INTO raw (visit, raft) VALUES (200, '2,2'), (100, '1,1'), (100, '0,1'), (100, '1,1'), (200, '2,2');
         INSERT INTO raw_visit (visit, filter) VALUES (200, 'r'), (100, 'g'), (200, 'r'), (300, 'g');")
        .unwrap();
}

fn repo_with_registry() -> (tempfile::TempDir, RepoHandle) {
    let tmp = tempfile::tempdir().unwrap();
    let repo = RepoHandle::new(tmp.path(), "/refs", "m");
    seed_registry(&repo.registry_path());
    (tmp, repo)
}

#[test]
fn visits_and_filters_are_distinct_and_ordered() {
    let (_tmp, repo) = repo_with_registry();
    let registry = SqliteRegistry::new(repo.registry_path());
    assert_eq!(registry.visits().unwrap(), vec![100, 200, 300]);
    assert_eq!(registry.filters().unwrap(), vec!["g".to_string(), "r".to_string()]);
}

#[test]
fn rafts_are_bound_to_visit() {
    let (_tmp, repo) = repo_with_registry();
    let registry = SqliteRegistry::new(repo.registry_path());
    assert_eq!(registry.rafts(100).unwrap(), vec!["0,1".to_string(), "1,1".to_string()]);
    assert_eq!(registry.rafts(200).unwrap(), vec!["2,2".to_string()]);
    assert!(registry.rafts(999).unwrap().is_empty());
}

#[test]
fn missing_registry_is_catalog_unavailable() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("registry.sqlite3");
    let registry = SqliteRegistry::new(&path);
    assert!(matches!(registry.visits(), Err(PersistenceError::MissingRegistry(_))));
    // No se crea un fichero vacío
    assert!(!path.exists());

    let source = RepoCatalogSource::for_repo(&RepoHandle::new(tmp.path(), "/refs", "m"), None);
    assert!(matches!(source.visits(), Err(PipelineError::CatalogUnavailable(_))));
}

#[test]
fn registry_opened_after_ingest_is_visible() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = RepoHandle::new(tmp.path(), "/refs", "m");
    let source = RepoCatalogSource::for_repo(&repo, None);
    assert!(source.filters().is_err());
    // La ingesta escribe el registro después
    seed_registry(&repo.registry_path());
    assert_eq!(source.filters().unwrap(), vec![FilterId::from("g"), FilterId::from("r")]);
}

#[test]
fn repo_source_combines_registry_and_skymap() {
    let (tmp, repo) = repo_with_registry();
    std::fs::write(repo.skymap_path(), r#"{"tracts":[{"id":0,"num_patches":[2,1]}]}"#).unwrap();

    let catalog = Catalog::new(RepoCatalogSource::for_repo(&repo, None));
    assert_eq!(catalog.visits().unwrap(), &[VisitId(100), VisitId(200), VisitId(300)]);
    assert_eq!(catalog.rafts(VisitId(100)).unwrap(), vec![RaftId::from("0,1"), RaftId::from("1,1")]);
    assert_eq!(catalog.patches(TractId(0)).unwrap(),
               vec![PatchId::from_index(0, 0), PatchId::from_index(1, 0)]);
    assert!(matches!(catalog.patches(TractId(4)), Err(PipelineError::CatalogUnavailable(_))));

    let custom = tmp.path().join("custom_skymap.json");
    std::fs::write(&custom, r#"{"tracts":[{"id":4,"num_patches":[1,3]}]}"#).unwrap();
    let source = RepoCatalogSource::for_repo(&repo, Some(custom));
    assert_eq!(source.patches(TractId(4)).unwrap().len(), 3);
}
