//! # Shell Subcommand
//!
//! Line-oriented menu for exploring and mutating a distributor graph by
//! hand. The shell only resolves ids and paths and renders results; every
//! permission decision is made by the graph.
//!
//! ```text
//! ----- Menu -----
//! 1. Create Distributor
//! 2. Add Region to Distributor
//! 3. Exclude Region from Distributor
//! 4. Add Parent to Distributor
//! 5. Check Distributor Permission
//! 6. List Distributors
//! 7. Remove Region from Distributor
//! 8. Exit
//! ```
//!
//! End of input exits the loop cleanly, so the shell can also be driven by
//! a piped script.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use regauth_core::{DistributorId, Region, RegionRegistry};
use regauth_distributor::DistributorGraph;

use crate::list::write_distributor;
use crate::{load_workspace, GlobalOpts};

/// Arguments for the `regauth shell` subcommand.
#[derive(Args, Debug, Default)]
pub struct ShellArgs {
    /// Suppress the menu banner before each prompt.
    #[arg(long)]
    pub quiet: bool,
}

/// Execute the shell subcommand against stdin and stdout.
pub fn run_shell(args: &ShellArgs, opts: &GlobalOpts) -> Result<u8> {
    let mut workspace = load_workspace(opts)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(
        &workspace.registry,
        &mut workspace.graph,
        stdin.lock(),
        stdout.lock(),
    );
    shell.quiet = args.quiet;
    shell.run()?;
    Ok(0)
}

/// The interactive menu loop over an arbitrary reader and writer.
pub struct Shell<'a, R, W> {
    registry: &'a RegionRegistry,
    graph: &'a mut DistributorGraph,
    input: R,
    output: W,
    /// Skip printing the menu banner.
    pub quiet: bool,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    /// Create a shell over a registry and graph.
    pub fn new(
        registry: &'a RegionRegistry,
        graph: &'a mut DistributorGraph,
        input: R,
        output: W,
    ) -> Self {
        Self {
            registry,
            graph,
            input,
            output,
            quiet: false,
        }
    }

    /// Run until the exit option or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            if !self.quiet {
                self.print_menu()?;
            }
            let Some(option) = self.prompt("Enter option: ")? else {
                break;
            };
            let keep_going = match option.as_str() {
                "1" => self.create_distributor()?,
                "2" => self.add_region()?,
                "3" => self.exclude_region()?,
                "4" => self.add_parent()?,
                "5" => self.check_permission()?,
                "6" => self.list_distributors()?,
                "7" => self.remove_region()?,
                "8" => {
                    writeln!(self.output, "Exiting.")?;
                    false
                }
                _ => {
                    writeln!(self.output, "Invalid option. Please try again.")?;
                    true
                }
            };
            if !keep_going {
                break;
            }
        }
        self.output.flush()
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n----- Menu -----")?;
        for line in [
            "1. Create Distributor",
            "2. Add Region to Distributor",
            "3. Exclude Region from Distributor",
            "4. Add Parent to Distributor",
            "5. Check Distributor Permission",
            "6. List Distributors",
            "7. Remove Region from Distributor",
            "8. Exit",
        ] {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for a distributor id that exists in the graph.
    fn prompt_distributor(&mut self, label: &str, missing: &str) -> io::Result<Option<DistributorId>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match DistributorId::new(&raw) {
            Ok(id) if self.graph.contains(&id) => Ok(Some(id)),
            _ => {
                writeln!(self.output, "{missing}")?;
                Ok(None)
            }
        }
    }

    /// Prompt for a region path that exists in the registry.
    fn prompt_region(&mut self, label: &str) -> io::Result<Option<&'a Region>> {
        let Some(path) = self.prompt(label)? else {
            return Ok(None);
        };
        let registry = self.registry;
        match registry.get_region(&path) {
            Some(region) => Ok(Some(region)),
            None => {
                writeln!(self.output, "Region not found.")?;
                Ok(None)
            }
        }
    }

    fn create_distributor(&mut self) -> io::Result<bool> {
        let Some(raw_id) = self.prompt("Enter distributor ID (unique string): ")? else {
            return Ok(false);
        };
        let Some(name) = self.prompt("Enter distributor Name: ")? else {
            return Ok(false);
        };
        let Some(paths) = self.prompt(
            "Enter authorized region paths (comma separated, e.g. 'India-Tamil Nadu-Keelakarai, India-Jammu and Kashmir-Punch'): ",
        )?
        else {
            return Ok(false);
        };

        let registry = self.registry;
        let mut regions = Vec::new();
        for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match registry.get_region(path) {
                Some(region) => regions.push(region),
                None => writeln!(self.output, "Region '{path}' not found. Skipping.")?,
            }
        }

        let created = DistributorId::new(&raw_id)
            .map_err(anyhow::Error::from)
            .and_then(|id| Ok(self.graph.create_distributor(id, name, regions)?.id().clone()));
        match created {
            Ok(_) => writeln!(self.output, "Distributor created.")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(true)
    }

    fn add_region(&mut self) -> io::Result<bool> {
        let Some(id) = self.prompt_distributor("Enter distributor ID: ", "Distributor not found.")? else {
            return Ok(true);
        };
        let Some(region) =
            self.prompt_region("Enter region path to add (e.g. 'India-Tamil Nadu-Keelakarai'): ")?
        else {
            return Ok(true);
        };
        match self.graph.add_region(&id, region) {
            Ok(()) => writeln!(self.output, "Region added to distributor.")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(true)
    }

    fn remove_region(&mut self) -> io::Result<bool> {
        let Some(id) = self.prompt_distributor("Enter distributor ID: ", "Distributor not found.")? else {
            return Ok(true);
        };
        let Some(region) = self.prompt_region("Enter region path to remove: ")? else {
            return Ok(true);
        };
        match self.graph.remove_region(&id, region) {
            Ok(()) => writeln!(self.output, "Region removed from distributor.")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(true)
    }

    fn exclude_region(&mut self) -> io::Result<bool> {
        let Some(id) = self.prompt_distributor("Enter distributor ID: ", "Distributor not found.")? else {
            return Ok(true);
        };
        let Some(region) = self.prompt_region("Enter region path to exclude: ")? else {
            return Ok(true);
        };
        match self.graph.exclude_region(&id, region) {
            Ok(()) => writeln!(self.output, "Region excluded from distributor.")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(true)
    }

    fn add_parent(&mut self) -> io::Result<bool> {
        let Some(child) =
            self.prompt_distributor("Enter child distributor ID: ", "Child distributor not found.")?
        else {
            return Ok(true);
        };
        let Some(parent) =
            self.prompt_distributor("Enter parent distributor ID: ", "Parent distributor not found.")?
        else {
            return Ok(true);
        };
        match self.graph.add_parent(&child, Some(&parent)) {
            Ok(()) => writeln!(self.output, "Parent added to distributor.")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(true)
    }

    fn check_permission(&mut self) -> io::Result<bool> {
        let Some(id) = self.prompt_distributor("Enter distributor ID: ", "Distributor not found.")? else {
            return Ok(true);
        };
        let Some(region) =
            self.prompt_region("Enter region path to check (e.g. 'India-Tamil Nadu-Keelakarai'): ")?
        else {
            return Ok(true);
        };
        match self.graph.has_permission(&id, region) {
            Ok(true) => writeln!(self.output, "Permission granted!")?,
            Ok(false) => writeln!(self.output, "Permission denied!")?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(true)
    }

    fn list_distributors(&mut self) -> io::Result<bool> {
        writeln!(self.output, "Listing Distributors:")?;
        for distributor in self.graph.iter() {
            write_distributor(&mut self.output, distributor)?;
        }
        Ok(true)
    }
}
