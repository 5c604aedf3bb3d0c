//! `package.xml` generation.

use crate::METADATA_NAMESPACE;
use crate::classify::ClassificationIndex;
use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;

/// Members of one metadata type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeGroup {
    /// Metadata type name, never empty
    pub name: String,
    /// Object names, unique and sorted
    pub members: Vec<String>,
}

/// The package descriptor consumed by the deployment tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    /// Type groups in type-name order
    pub groups: Vec<TypeGroup>,
    /// API version, passed through unmodified
    pub version: String,
}

impl PackageDescriptor {
    /// Group the classified objects by metadata type.
    ///
    /// Unresolved objects are left out. A recorded type whose every object was
    /// later reclassified under another type gets no group, so no `<types>`
    /// element is ever empty.
    #[must_use]
    pub fn build(index: &ClassificationIndex, version: &str) -> Self {
        let groups = index
            .metadata_types()
            .filter_map(|name| {
                let members: Vec<String> = index.members_of(name).map(str::to_string).collect();
                (!members.is_empty()).then(|| TypeGroup {
                    name: name.to_string(),
                    members,
                })
            })
            .collect();

        Self {
            groups,
            version: version.to_string(),
        }
    }

    /// Total number of members across all groups
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Serialize as an indented XML document
    ///
    /// # Errors
    ///
    /// Returns an error if the XML writer fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(
            BytesStart::new("Package").with_attributes([("xmlns", METADATA_NAMESPACE)]),
        ))?;

        for group in &self.groups {
            writer.write_event(Event::Start(BytesStart::new("types")))?;
            for member in &group.members {
                write_text_element(&mut writer, "members", member)?;
            }
            write_text_element(&mut writer, "name", &group.name)?;
            writer.write_event(Event::End(BytesEnd::new("types")))?;
        }

        write_text_element(&mut writer, "version", &self.version)?;
        writer.write_event(Event::End(BytesEnd::new("Package")))?;

        let mut xml = String::from_utf8(writer.into_inner())?;
        xml.push('\n');
        Ok(xml)
    }
}

/// `<tag>text</tag>` on one line
fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
