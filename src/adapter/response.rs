//! OAI-PMH XML envelope
//!
//! Writes `responseDate`, the `request` echo, then either the verb element
//! or an `error` element. List pages that continue get a freshly issued
//! resumption token as the last child of the verb element.

use crate::error::{Error, Result};
use crate::metadata::{MetadataFormat, OAI_DC_NAMESPACE};
use crate::protocol::{Header, Identify, ListPage, OaiResponse, Record, RecordMetadata, SetEntry};
use crate::token::TokenCodec;
use crate::types::{format_datestamp, Timestamp};
use crate::xml::{self, XmlWriter};

const OAI_NAMESPACE: &str = "http://www.openarchives.org/OAI/2.0/";
const OAI_SCHEMA_LOCATION: &str =
    "http://www.openarchives.org/OAI/2.0/ http://www.openarchives.org/OAI/2.0/OAI-PMH.xsd";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// Serializes responses into the OAI-PMH envelope
#[derive(Debug, Clone)]
pub struct EnvelopeWriter {
    base_url: String,
    codec: TokenCodec,
}

impl EnvelopeWriter {
    /// Create a writer for the endpoint at `base_url`
    pub fn new(base_url: impl Into<String>, codec: TokenCodec) -> Self {
        Self {
            base_url: base_url.into(),
            codec,
        }
    }

    /// Write a successful response
    pub fn write_response(
        &self,
        echo: &[(&str, &str)],
        response: &OaiResponse,
        now: Timestamp,
    ) -> Result<String> {
        let mut w = self.open(echo, now)?;
        let verb = response.verb();
        xml::start(&mut w, verb.as_str(), &[])?;

        match response {
            OaiResponse::Identify(identify) => write_identify(&mut w, identify)?,
            OaiResponse::GetRecord(record) => write_record(&mut w, record)?,
            OaiResponse::ListIdentifiers(page) => {
                for header in &page.items {
                    write_header(&mut w, header)?;
                }
                self.write_resumption(&mut w, page, now)?;
            }
            OaiResponse::ListRecords(page) => {
                for record in &page.items {
                    write_record(&mut w, record)?;
                }
                self.write_resumption(&mut w, page, now)?;
            }
            OaiResponse::ListSets(page) => {
                for set in &page.items {
                    write_set(&mut w, set)?;
                }
                self.write_resumption(&mut w, page, now)?;
            }
            OaiResponse::ListMetadataFormats(formats) => {
                for format in formats {
                    write_format(&mut w, format)?;
                }
            }
        }

        xml::end(&mut w, verb.as_str())?;
        close(w)
    }

    /// Write a protocol error
    ///
    /// Fails with the error itself when it has no OAI-PMH code.
    pub fn write_error(
        &self,
        echo: &[(&str, &str)],
        error: &Error,
        now: Timestamp,
    ) -> Result<String> {
        let code = error
            .oai_code()
            .ok_or_else(|| Error::render(format!("Not a protocol error: {error}")))?;

        let mut w = self.open(echo, now)?;
        xml::text_element_with_attrs(&mut w, "error", &[("code", code)], &error.to_string())?;
        close(w)
    }

    fn open(&self, echo: &[(&str, &str)], now: Timestamp) -> Result<XmlWriter> {
        let mut w = xml::new_writer();
        xml::declaration(&mut w)?;
        xml::start(
            &mut w,
            "OAI-PMH",
            &[
                ("xmlns", OAI_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
                ("xsi:schemaLocation", OAI_SCHEMA_LOCATION),
            ],
        )?;
        xml::text_element(&mut w, "responseDate", &format_datestamp(&now))?;
        xml::text_element_with_attrs(&mut w, "request", echo, &self.base_url)?;
        Ok(w)
    }

    /// Issue the token for the next page, if there is one
    fn write_resumption<T>(
        &self,
        w: &mut XmlWriter,
        page: &ListPage<T>,
        now: Timestamp,
    ) -> Result<()> {
        let Some(next_cursor) = page.next_cursor else {
            return Ok(());
        };

        let token = self
            .codec
            .issue(page.criteria.clone(), next_cursor, page.complete_list_size, now);
        let encoded = self.codec.encode(&token);

        let cursor = next_cursor.to_string();
        let size = page.complete_list_size.to_string();
        let mut attrs = vec![("cursor", cursor.as_str()), ("completeListSize", size.as_str())];
        let expiration = token.expiration_date.map(|at| format_datestamp(&at));
        if let Some(expiration) = &expiration {
            attrs.push(("expirationDate", expiration.as_str()));
        }

        xml::text_element_with_attrs(w, "resumptionToken", &attrs, &encoded)
    }
}

fn close(mut w: XmlWriter) -> Result<String> {
    xml::end(&mut w, "OAI-PMH")?;
    xml::finish(w)
}

fn write_identify(w: &mut XmlWriter, identify: &Identify) -> Result<()> {
    xml::text_element(w, "repositoryName", &identify.repository_name)?;
    xml::text_element(w, "baseURL", &identify.base_url)?;
    xml::text_element(w, "protocolVersion", &identify.protocol_version)?;
    for email in &identify.admin_emails {
        xml::text_element(w, "adminEmail", email)?;
    }
    xml::text_element(
        w,
        "earliestDatestamp",
        &format_datestamp(&identify.earliest_datestamp),
    )?;
    xml::text_element(w, "deletedRecord", &identify.deleted_record)?;
    xml::text_element(w, "granularity", &identify.granularity)?;
    for compression in &identify.compression {
        xml::text_element(w, "compression", compression)?;
    }
    Ok(())
}

fn write_header(w: &mut XmlWriter, header: &Header) -> Result<()> {
    xml::start(w, "header", &[])?;
    xml::text_element(w, "identifier", &header.identifier)?;
    xml::text_element(w, "datestamp", &format_datestamp(&header.datestamp))?;
    for spec in &header.set_specs {
        xml::text_element(w, "setSpec", spec)?;
    }
    xml::end(w, "header")
}

fn write_record(w: &mut XmlWriter, record: &Record) -> Result<()> {
    xml::start(w, "record", &[])?;
    write_header(w, &record.header)?;
    xml::start(w, "metadata", &[])?;
    match &record.metadata {
        RecordMetadata::DublinCore(dc) => dc.write_xml(w)?,
        RecordMetadata::Serialized(markup) => xml::raw(w, markup)?,
    }
    xml::end(w, "metadata")?;
    xml::end(w, "record")
}

fn write_set(w: &mut XmlWriter, set: &SetEntry) -> Result<()> {
    xml::start(w, "set", &[])?;
    xml::text_element(w, "setSpec", &set.spec)?;
    xml::text_element(w, "setName", &set.name)?;
    if let Some(description) = set.description.as_deref().filter(|d| !d.is_empty()) {
        xml::start(w, "setDescription", &[])?;
        xml::start(
            w,
            "oai_dc:dc",
            &[("xmlns:oai_dc", OAI_DC_NAMESPACE), ("xmlns:dc", DC_NAMESPACE)],
        )?;
        xml::text_element(w, "dc:description", description)?;
        xml::end(w, "oai_dc:dc")?;
        xml::end(w, "setDescription")?;
    }
    xml::end(w, "set")
}

fn write_format(w: &mut XmlWriter, format: &MetadataFormat) -> Result<()> {
    xml::start(w, "metadataFormat", &[])?;
    xml::text_element(w, "metadataPrefix", &format.prefix)?;
    xml::text_element(w, "schema", &format.schema)?;
    xml::text_element(w, "metadataNamespace", &format.namespace)?;
    xml::end(w, "metadataFormat")
}
