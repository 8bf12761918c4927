//! RDF metadata rendering
//!
//! Formats that carry DCAT profiles are delegated to a `MetadataRenderer`,
//! which returns a serialized RDF/XML document spliced verbatim into the
//! `<metadata>` element.

use crate::error::Result;
use crate::repository::Dataset;
use crate::types::format_datestamp;
use crate::xml;

const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const DCAT_NAMESPACE: &str = "http://www.w3.org/ns/dcat#";
const DCT_NAMESPACE: &str = "http://purl.org/dc/terms/";
const FOAF_NAMESPACE: &str = "http://xmlns.com/foaf/0.1/";
const ADMS_NAMESPACE: &str = "http://www.w3.org/ns/adms#";
const XSD_DATETIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

/// Serializes a dataset under a set of RDF profiles
pub trait MetadataRenderer: Send + Sync {
    /// Render the dataset as an RDF/XML document
    fn render_profile(&self, dataset: &Dataset, profiles: &[String]) -> Result<String>;
}

/// Built-in DCAT renderer
///
/// Emits the DCAT-AP core of a dataset. The output does not vary by
/// profile; deployments needing profile-specific shapes plug in their own
/// `MetadataRenderer`.
#[derive(Debug, Clone)]
pub struct DcatRdfRenderer {
    site_url: String,
}

impl DcatRdfRenderer {
    /// Create a renderer that mints dataset URIs under `site_url`
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }

    fn dataset_uri(&self, dataset: &Dataset) -> String {
        format!("{}/dataset/{}", self.site_url.trim_end_matches('/'), dataset.id)
    }
}

impl MetadataRenderer for DcatRdfRenderer {
    fn render_profile(&self, dataset: &Dataset, profiles: &[String]) -> Result<String> {
        tracing::trace!(dataset = %dataset.id, ?profiles, "Rendering DCAT");

        let mut w = xml::new_writer();
        xml::start(
            &mut w,
            "rdf:RDF",
            &[
                ("xmlns:rdf", RDF_NAMESPACE),
                ("xmlns:dcat", DCAT_NAMESPACE),
                ("xmlns:dct", DCT_NAMESPACE),
                ("xmlns:foaf", FOAF_NAMESPACE),
                ("xmlns:adms", ADMS_NAMESPACE),
            ],
        )?;

        let uri = self.dataset_uri(dataset);
        xml::start(&mut w, "dcat:Dataset", &[("rdf:about", uri.as_str())])?;

        xml::text_element(&mut w, "dct:identifier", &dataset.id)?;
        xml::text_element(
            &mut w,
            "dct:title",
            dataset.title.as_deref().unwrap_or(&dataset.name),
        )?;
        if let Some(notes) = dataset.notes.as_deref().filter(|n| !n.is_empty()) {
            xml::text_element(&mut w, "dct:description", notes)?;
        }

        let issued = format_datestamp(&dataset.metadata_created);
        let modified = format_datestamp(&dataset.metadata_modified);
        xml::text_element_with_attrs(&mut w, "dct:issued", &[("rdf:datatype", XSD_DATETIME)], &issued)?;
        xml::text_element_with_attrs(
            &mut w,
            "dct:modified",
            &[("rdf:datatype", XSD_DATETIME)],
            &modified,
        )?;

        for tag in &dataset.tags {
            xml::text_element(&mut w, "dcat:keyword", tag.label())?;
        }
        if let Some(language) = &dataset.language {
            for code in language.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                xml::text_element(&mut w, "dct:language", code)?;
            }
        }
        if let Some(license) = dataset.license_title.as_deref().filter(|l| !l.is_empty()) {
            xml::text_element(&mut w, "dct:license", license)?;
        }

        for (role, property) in [("author", "dct:creator"), ("distributor", "dct:publisher")] {
            for name in dataset.agents_with_role(role).filter_map(|a| a.name.as_deref()) {
                xml::start(&mut w, property, &[])?;
                xml::start(&mut w, "foaf:Agent", &[])?;
                xml::text_element(&mut w, "foaf:name", name)?;
                xml::end(&mut w, "foaf:Agent")?;
                xml::end(&mut w, property)?;
            }
        }

        for pid in dataset.pids.iter().filter_map(|p| p.id.as_deref()) {
            xml::text_element(&mut w, "adms:identifier", pid)?;
        }

        xml::end(&mut w, "dcat:Dataset")?;
        xml::end(&mut w, "rdf:RDF")?;
        xml::finish(w)
    }
}
