//! Function templates for the generated Go source
//!
//! Each template only places values computed by its renderer; SQL text,
//! argument lists and scan targets arrive finished in the context record.

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Create function template
pub const CREATE_TEMPLATE: &str = r"
// Create{{suffix}} inserts an entry into DB
func Create{{suffix}}(db cruderQueryRower, x {{model}}) (*{{model}}, error) {
	var y {{model}}
	err := db.QueryRow(
		`{{query}}`,{{#if args}}
		{{args}},{{/if}}
	).Scan({{scan}})

	return &y, err
}
";

/// Get function template
pub const GET_TEMPLATE: &str = r"
// Get{{suffix}} returns a single entry from DB based on primary key
func Get{{suffix}}(db cruderQueryRower, id interface{}) (*{{model}}, error) {
	var y {{model}}
	err := db.QueryRow(
		`{{query}}`,
		id,
	).Scan({{scan}})

	return &y, err
}
";

/// List function template
pub const LIST_TEMPLATE: &str = r#"
// List{{suffix}} returns a list of entries from DB based on passed in limit, offset, filters and sorting
func List{{suffix}}(db cruderQueryer, limit, offset uint64, filter cruderSQLFilter, sorter cruderSQLSorter) ([]{{model}}, error) {
	var args []interface{}
	sqlParts := []string{`{{select}}`}{{#if soft_delete_where}}
	sqlParts = append(sqlParts, `{{soft_delete_where}}`){{/if}}

	if filter != nil {
		if filters, filterArgs := filter.Where(); filters != "" {
			sqlParts = append(sqlParts, "{{filter_join}} "+filters)
			args = append(args, filterArgs...)
		}
	}

	if sorter != nil {
		if orderBy := sorter.OrderBy(); orderBy != "" {
			sqlParts = append(sqlParts, "ORDER BY "+orderBy)
		}
	}

	if limit > 0 {
		sqlParts = append(sqlParts, fmt.Sprintf("LIMIT %d", limit))
	}
	if offset > 0 {
		sqlParts = append(sqlParts, fmt.Sprintf("OFFSET %d", offset))
	}

	rows, err := db.Query(
		strings.Join(sqlParts, " "),
		args...,
	)
	if err != nil {
		return nil, err
	}
	defer rows.Close()

	r := make([]{{model}}, 0)
	for rows.Next() {
		var e {{model}}
		if err := rows.Scan({{scan}}); err != nil {
			return nil, err
		}
		r = append(r, e)
	}

	return r, rows.Err()
}
"#;

/// Update function template
pub const UPDATE_TEMPLATE: &str = r"
// Update{{suffix}} updates an entry in DB
func Update{{suffix}}(db cruderQueryRower, x {{model}}) (*{{model}}, error) {
	var y {{model}}
	err := db.QueryRow(
		`{{query}}`,
		{{args}},
	).Scan({{scan}})

	return &y, err
}
";

/// Delete function template
pub const DELETE_TEMPLATE: &str = r"
// Delete{{suffix}} deletes an entry from DB
func Delete{{suffix}}(db cruderExecer, id interface{}) error {
	result, err := db.Exec(
		`{{query}}`,
		id,
	)
	if err != nil {
		return err
	}

	r, err := result.RowsAffected()
	if err != nil {
		return err
	}
	if r == 0 {
		return ErrNoRowsAffected
	}

	return nil
}
";

/// Named templates for every operation
#[derive(Debug)]
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Compile the built-in templates
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in template fails to compile.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Generating Go, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        // A context missing a slot is an error, not empty text
        handlebars.set_strict_mode(true);

        handlebars.register_template_string("create", CREATE_TEMPLATE)?;
        handlebars.register_template_string("get", GET_TEMPLATE)?;
        handlebars.register_template_string("list", LIST_TEMPLATE)?;
        handlebars.register_template_string("update", UPDATE_TEMPLATE)?;
        handlebars.register_template_string("delete", DELETE_TEMPLATE)?;

        Ok(Self { handlebars })
    }

    /// Render the template registered as `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or `context` lacks a value
    /// the template places.
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        Ok(self.handlebars.render(name, context)?)
    }
}
