//! Integration tests for the file-backed store driven through the service.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use biosamples::model::{Attribute, Owner, Relationship, StructuredDataTable, SubmissionChannel};
use biosamples::store::{CurationRepository, JsonFileStore, SampleRepository};
use biosamples::{Curation, RegistryConfig, Sample, SampleService, WriteContext};

fn open(dir: &TempDir) -> Arc<JsonFileStore> {
    Arc::new(JsonFileStore::open(dir.path()).expect("Failed to open store"))
}

fn context() -> WriteContext {
    WriteContext::new(Owner::WebinAccount("Webin-7".into()), SubmissionChannel::FileUpload)
}

fn rich_sample() -> Sample {
    Sample::new("soil core")
        .with_release(Utc::now())
        .with_tax_id(410658)
        .with_attribute(Attribute::new("depth", "12").with_unit("cm"))
        .with_relationship(Relationship::unsourced("derived from", "SAMEA900"))
        .with_structured_data(StructuredDataTable::new("AMR").with_row([("antibiotic", "ampicillin")]))
}

#[test]
fn test_record_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let written = {
        let service = SampleService::with_store(&RegistryConfig::default(), open(&dir));
        service.submit(&rich_sample(), &context()).unwrap()
    };

    let store = open(&dir);
    let accession = written.sample.accession.clone().unwrap();
    assert_eq!(store.get(&accession).unwrap(), Some(written.sample));
}

#[test]
fn test_accessions_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    let first = SampleService::with_store(&RegistryConfig::default(), open(&dir))
        .submit(&rich_sample(), &context())
        .unwrap();
    let second = SampleService::with_store(&RegistryConfig::default(), open(&dir))
        .submit(&rich_sample(), &context())
        .unwrap();

    let a = first.sample.accession.unwrap().number().unwrap();
    let b = second.sample.accession.unwrap().number().unwrap();
    assert!(b > a);
}

#[test]
fn test_resubmission_through_store() {
    let dir = TempDir::new().unwrap();
    let service = SampleService::with_store(&RegistryConfig::default(), open(&dir));

    let first = service.submit(&rich_sample(), &context()).unwrap();
    let accession = first.sample.accession.clone().unwrap();

    let mut edit = Sample::new("soil core, re-measured")
        .with_release(Utc::now())
        .with_attribute(Attribute::new("depth", "14").with_unit("cm"));
    edit.accession = Some(accession.clone());

    let second = service.submit(&edit, &context()).unwrap();

    assert_eq!(second.sample.sra_accession(), first.sample.sra_accession());
    assert_eq!(second.sample.create, first.sample.create);
    assert_eq!(second.sample.structured_data, first.sample.structured_data);
    assert!(second.outcome.structured_data_retained);
    assert_eq!(service.fetch(&accession).unwrap(), Some(second.sample));
}

#[test]
fn test_curation_files_deduplicate() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let service = SampleService::with_store(&RegistryConfig::default(), store.clone());

    let written = service.submit(&rich_sample(), &context()).unwrap();
    let accession = written.sample.accession.unwrap();
    let curation = Curation::attributes(
        [Attribute::new("depth", "12").with_unit("cm")],
        [Attribute::new("depth", "0.12").with_unit("m")],
    );

    let link = service
        .attach_curation(&accession, &curation, Owner::Domain("self.curators".into()))
        .unwrap();
    service
        .attach_curation(&accession, &curation, Owner::Domain("self.curators".into()))
        .unwrap();

    assert_eq!(std::fs::read_dir(dir.path().join("curations")).unwrap().count(), 1);
    assert_eq!(std::fs::read_dir(dir.path().join("links")).unwrap().count(), 1);
    assert_eq!(store.get_curation(curation.hash()).unwrap(), Some(curation));
    assert_eq!(store.links_for(&accession).unwrap(), vec![link]);

    let curated = service.fetch_curated(&accession).unwrap().unwrap();
    assert!(curated.attributes.contains(&Attribute::new("depth", "0.12").with_unit("m")));
}
