//! ST7789 panel controller driver
//!
//! Drives the 240x240 IPS panel on the LCD HAT. The controller's memory
//! access register (MADCTL) does the physical orientation; frames are
//! counter-rotated before packing so that logical (0, 0) stays top-left
//! for the viewer.
//!
//! # Link states
//!
//! ```text
//! Uninitialized --reset--> Reset --init table--> Configured
//!        ^                                           |
//!        +------------- init() again ---------------+
//!                                                    | shutdown()
//!                                                    v
//!                                                 Released
//! ```

use embedded_hal::delay::DelayNs;
use log::{info, warn};
use pettrac_display::{
    DisplayBackend, DisplayError, DisplayWindow, FrameBuffer, Rotation, PANEL_HEIGHT, PANEL_WIDTH,
};
use pettrac_hal::{OutputPin, PwmOutput, SpiBus};

use super::bus::HardwareBus;

/// Command bytes
pub mod cmd {
    /// Sleep out
    pub const SLPOUT: u8 = 0x11;
    /// Display inversion on
    pub const INVON: u8 = 0x21;
    /// Display on
    pub const DISPON: u8 = 0x29;
    /// Column address set
    pub const CASET: u8 = 0x2A;
    /// Row address set
    pub const RASET: u8 = 0x2B;
    /// Memory write
    pub const RAMWR: u8 = 0x2C;
    /// Memory data access control (orientation)
    pub const MADCTL: u8 = 0x36;
    /// Interface pixel format
    pub const COLMOD: u8 = 0x3A;
    /// Porch setting
    pub const PORCTRL: u8 = 0xB2;
    /// Gate control
    pub const GCTRL: u8 = 0xB7;
    /// VCOM setting
    pub const VCOMS: u8 = 0xBB;
    /// LCM control
    pub const LCMCTRL: u8 = 0xC0;
    /// VDV and VRH command enable
    pub const VDVVRHEN: u8 = 0xC2;
    /// VRH set
    pub const VRHS: u8 = 0xC3;
    /// VDV set
    pub const VDVS: u8 = 0xC4;
    /// Frame rate control in normal mode
    pub const FRCTRL2: u8 = 0xC6;
    /// Power control 1
    pub const PWCTRL1: u8 = 0xD0;
    /// Positive voltage gamma control
    pub const PVGAMCTRL: u8 = 0xE0;
    /// Negative voltage gamma control
    pub const NVGAMCTRL: u8 = 0xE1;
}

/// 16 bits/pixel, 65K colours
const COLMOD_RGB565: u8 = 0x05;

/// Register setup sent after MADCTL, in order
const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (cmd::COLMOD, &[COLMOD_RGB565]),
    (cmd::PORCTRL, &[0x0C, 0x0C, 0x00, 0x33, 0x33]),
    (cmd::GCTRL, &[0x35]),
    (cmd::VCOMS, &[0x19]),
    (cmd::LCMCTRL, &[0x2C]),
    (cmd::VDVVRHEN, &[0x01]),
    (cmd::VRHS, &[0x12]),
    (cmd::VDVS, &[0x20]),
    (cmd::FRCTRL2, &[0x0F]),
    (cmd::PWCTRL1, &[0xA4, 0xA1]),
    (
        cmd::PVGAMCTRL,
        &[
            0xD0, 0x04, 0x0D, 0x11, 0x13, 0x2B, 0x3F, 0x54, 0x4C, 0x18, 0x0D, 0x0B, 0x1F, 0x23,
        ],
    ),
    (
        cmd::NVGAMCTRL,
        &[
            0xD0, 0x04, 0x0C, 0x11, 0x13, 0x2C, 0x3F, 0x44, 0x51, 0x2F, 0x1F, 0x1F, 0x20, 0x23,
        ],
    ),
    (cmd::INVON, &[]),
    (cmd::SLPOUT, &[]),
    (cmd::DISPON, &[]),
];

/// State of the physical link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Nothing sent yet, or a previous init failed
    Uninitialized,
    /// Reset pulse done, registers not yet written
    Reset,
    /// Init table written, frames can be sent
    Configured,
    /// Lines parked by `shutdown()`
    Released,
}

/// ST7789 display driver
pub struct St7789<SPI, DC, RST, BL, D> {
    bus: HardwareBus<SPI, DC, RST, BL>,
    delay: D,
    rotation: Rotation,
    link: LinkState,
    width: usize,
    height: usize,
    /// Packed RGB565 transfer buffer, reused across frames
    tx: Vec<u8>,
}

impl<SPI, DC, RST, BL, D> St7789<SPI, DC, RST, BL, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
    BL: PwmOutput,
    D: DelayNs,
{
    /// Create a driver for the 240x240 panel
    ///
    /// Nothing is sent until [`DisplayBackend::init`].
    pub fn new(bus: HardwareBus<SPI, DC, RST, BL>, delay: D, rotation: Rotation) -> Self {
        Self {
            bus,
            delay,
            rotation,
            link: LinkState::Uninitialized,
            width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
            tx: Vec::new(),
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn bus(&self) -> &HardwareBus<SPI, DC, RST, BL> {
        &self.bus
    }

    /// Address a rectangle and arm a memory write
    ///
    /// End coordinates are sent inclusive (`x1 - 1`, `y1 - 1`); the high
    /// bytes are always zero on a 240 pixel panel.
    pub fn set_window(&mut self, window: DisplayWindow) -> Result<(), DisplayError> {
        let (x_end, y_end) = window.end_bytes();
        self.bus
            .send(cmd::CASET, &[0x00, (window.x0 & 0xFF) as u8, 0x00, x_end])?;
        self.bus
            .send(cmd::RASET, &[0x00, (window.y0 & 0xFF) as u8, 0x00, y_end])?;
        self.bus.command(cmd::RAMWR)
    }

    fn full_window(&self) -> DisplayWindow {
        DisplayWindow::full(self.width as u16, self.height as u16)
    }

    fn ensure_configured(&self) -> Result<(), DisplayError> {
        if self.link == LinkState::Configured {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }

    /// Send `tx` into the full panel window
    fn flush_tx(&mut self) -> Result<(), DisplayError> {
        self.set_window(self.full_window())?;
        self.bus.data(&self.tx)
    }
}

impl<SPI, DC, RST, BL, D> DisplayBackend for St7789<SPI, DC, RST, BL, D>
where
    SPI: SpiBus,
    DC: OutputPin,
    RST: OutputPin,
    BL: PwmOutput,
    D: DelayNs,
{
    fn init(&mut self) -> Result<(), DisplayError> {
        self.link = LinkState::Uninitialized;
        self.bus.reset(&mut self.delay);
        self.link = LinkState::Reset;

        self.bus.send(cmd::MADCTL, &[self.rotation.madctl()])?;
        for &(command, params) in INIT_SEQUENCE {
            self.bus.send(command, params)?;
        }

        self.link = LinkState::Configured;
        info!("Display initialized with rotation: {}", self.rotation);
        Ok(())
    }

    fn show(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let expected = self.dimensions();
        let actual = (frame.width(), frame.height());
        if actual != expected {
            return Err(DisplayError::DimensionMismatch { expected, actual });
        }
        self.ensure_configured()?;

        frame.write_rgb565(self.rotation.compensation(), &mut self.tx);
        self.flush_tx()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.ensure_configured()?;

        self.tx.clear();
        self.tx.resize(self.width * self.height * 2, 0xFF);
        self.flush_tx()
    }

    fn set_backlight(&mut self, duty: u8) -> Result<(), DisplayError> {
        self.bus.set_backlight(duty)
    }

    fn set_rotation(&mut self, rotation: Rotation) -> Result<(), DisplayError> {
        self.rotation = rotation;
        self.init()
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn shutdown(&mut self) {
        if self.link == LinkState::Released {
            return;
        }
        if self.link == LinkState::Configured {
            if let Err(e) = self.clear() {
                warn!("Failed to clear display on shutdown: {}", e);
            }
        }
        self.bus.release();
        self.link = LinkState::Released;
        info!("Display released");
    }

    fn is_ready(&self) -> bool {
        self.link == LinkState::Configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::bus::MAX_TRANSFER;
    use crate::display::mock::{self, Op};
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics::prelude::RgbColor;

    const FRAME_BYTES: usize = PANEL_WIDTH * PANEL_HEIGHT * 2;

    fn configured(rotation: Rotation) -> (mock::MockPanel, mock::Log) {
        let (mut panel, log, _) = mock::panel(rotation);
        panel.init().unwrap();
        log.borrow_mut().clear();
        (panel, log)
    }

    #[test]
    fn test_init_starts_with_reset_then_madctl() {
        let (mut panel, log, _) = mock::panel(Rotation::Deg0);

        panel.init().unwrap();

        assert_eq!(
            log.borrow()[..6],
            [
                Op::Rst(true),
                Op::DelayMs(10),
                Op::Rst(false),
                Op::DelayMs(10),
                Op::Rst(true),
                Op::DelayMs(10),
            ]
        );
        let commands = mock::commands(&log);
        assert_eq!(commands[0], (cmd::MADCTL, vec![0x70]));
        assert!(panel.is_ready());
        assert_eq!(panel.link_state(), LinkState::Configured);
    }

    #[test]
    fn test_init_register_table() {
        let (mut panel, log, _) = mock::panel(Rotation::Deg0);
        panel.init().unwrap();

        let commands = mock::commands(&log);
        let expected: Vec<(u8, Vec<u8>)> = INIT_SEQUENCE
            .iter()
            .map(|(c, p)| (*c, p.to_vec()))
            .collect();
        assert_eq!(commands[1..], expected[..]);
        assert_eq!(commands[1], (0x3A, vec![0x05]));
        assert_eq!(
            commands.last().map(|(c, _)| *c),
            Some(cmd::DISPON)
        );
    }

    #[test]
    fn test_madctl_per_rotation() {
        for (rotation, value) in [
            (Rotation::Deg0, 0x70),
            (Rotation::Deg90, 0x10),
            (Rotation::Deg180, 0xC0),
            (Rotation::Deg270, 0xA0),
        ] {
            let (mut panel, log, _) = mock::panel(rotation);
            panel.init().unwrap();
            assert_eq!(mock::commands(&log)[0], (cmd::MADCTL, vec![value]));
        }
    }

    #[test]
    fn test_window_end_bytes_are_inclusive() {
        let (mut panel, log) = configured(Rotation::Deg0);

        panel.set_window(DisplayWindow::full(240, 240)).unwrap();

        assert_eq!(
            mock::commands(&log),
            [
                (cmd::CASET, vec![0x00, 0, 0x00, 239]),
                (cmd::RASET, vec![0x00, 0, 0x00, 239]),
                (cmd::RAMWR, vec![]),
            ]
        );
    }

    #[test]
    fn test_show_streams_full_frame_in_chunks() {
        let (mut panel, log) = configured(Rotation::Deg0);
        let mut frame = FrameBuffer::panel();
        frame.fill(Rgb888::new(248, 252, 248));

        panel.show(&frame).unwrap();

        let commands = mock::commands(&log);
        let (command, pixels) = commands.last().unwrap();
        assert_eq!(*command, cmd::RAMWR);
        assert_eq!(pixels.len(), FRAME_BYTES);
        assert!(pixels.chunks(2).all(|p| p == [0xFF, 0xFF]));

        let writes: Vec<usize> = log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Write(bytes) if bytes.len() > 4 => Some(bytes.len()),
                _ => None,
            })
            .collect();
        assert!(writes.iter().all(|len| *len <= MAX_TRANSFER));
        assert_eq!(writes.len(), FRAME_BYTES.div_ceil(MAX_TRANSFER));
    }

    #[test]
    fn test_rotation_90_moves_origin_to_row_end() {
        let (mut panel, log, _) = mock::panel(Rotation::Deg0);
        panel.set_rotation(Rotation::Deg90).unwrap();
        assert_eq!(mock::commands(&log)[0], (cmd::MADCTL, vec![0x10]));
        log.borrow_mut().clear();

        let mut frame = FrameBuffer::panel();
        frame.set_pixel(0, 0, Rgb888::RED);
        panel.show(&frame).unwrap();

        let commands = mock::commands(&log);
        let pixels = &commands.last().unwrap().1;
        // Counter-rotated by 270 degrees: logical (0, 0) lands at (239, 0)
        let offset = 239 * 2;
        assert_eq!(pixels[offset..offset + 2], [0xF8, 0x00]);
        let lit = pixels.iter().filter(|b| **b != 0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_rotation_180_moves_origin_to_last_pixel() {
        let (mut panel, log) = configured(Rotation::Deg180);
        let mut frame = FrameBuffer::panel();
        frame.set_pixel(0, 0, Rgb888::BLUE);

        panel.show(&frame).unwrap();

        let pixels = mock::commands(&log).pop().unwrap().1;
        assert_eq!(pixels[FRAME_BYTES - 2..], [0x00, 0x1F]);
    }

    #[test]
    fn test_show_rejects_wrong_size() {
        let (mut panel, log) = configured(Rotation::Deg0);
        let frame = FrameBuffer::new(100, 120);

        assert_eq!(
            panel.show(&frame),
            Err(DisplayError::DimensionMismatch {
                expected: (240, 240),
                actual: (100, 120),
            })
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_show_before_init() {
        let (mut panel, log, _) = mock::panel(Rotation::Deg0);

        assert_eq!(
            panel.show(&FrameBuffer::panel()),
            Err(DisplayError::NotInitialized)
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_show_reports_bus_failure() {
        let (mut panel, _, fail) = mock::panel(Rotation::Deg0);
        panel.init().unwrap();
        fail.set(true);

        assert_eq!(
            panel.show(&FrameBuffer::panel()),
            Err(DisplayError::Communication)
        );
        // A dropped frame does not take the link down
        assert!(panel.is_ready());
    }

    #[test]
    fn test_init_failure_leaves_link_unconfigured() {
        let (mut panel, _, fail) = mock::panel(Rotation::Deg0);
        fail.set(true);

        assert_eq!(panel.init(), Err(DisplayError::Communication));
        assert_eq!(panel.link_state(), LinkState::Reset);
        assert!(!panel.is_ready());
    }

    #[test]
    fn test_clear_fills_white() {
        let (mut panel, log) = configured(Rotation::Deg0);

        panel.clear().unwrap();

        let pixels = mock::commands(&log).pop().unwrap().1;
        assert_eq!(pixels.len(), FRAME_BYTES);
        assert!(pixels.iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_set_rotation_degrees_rejects_odd_angles() {
        let (mut panel, log) = configured(Rotation::Deg0);

        assert_eq!(
            panel.set_rotation_degrees(45),
            Err(DisplayError::InvalidRotation(45))
        );
        assert_eq!(panel.rotation(), Rotation::Deg0);
        assert!(log.borrow().is_empty());

        panel.set_rotation_degrees(270).unwrap();
        assert_eq!(panel.rotation(), Rotation::Deg270);
    }

    #[test]
    fn test_shutdown_clears_then_parks() {
        let (mut panel, log) = configured(Rotation::Deg0);
        panel.set_backlight(80).unwrap();

        panel.shutdown();

        let ops = log.borrow();
        assert_eq!(
            ops[ops.len() - 3..],
            [Op::Rst(true), Op::Dc(false), Op::Backlight(0)]
        );
        drop(ops);
        let pixels = mock::commands(&log).pop().unwrap().1;
        assert!(pixels.iter().all(|b| *b == 0xFF));
        assert_eq!(panel.link_state(), LinkState::Released);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (mut panel, log) = configured(Rotation::Deg0);

        panel.shutdown();
        let after_first = log.borrow().len();
        panel.shutdown();

        assert_eq!(log.borrow().len(), after_first);
    }

    #[test]
    fn test_shutdown_without_init_only_parks_lines() {
        let (mut panel, log, _) = mock::panel(Rotation::Deg0);

        panel.shutdown();

        assert_eq!(
            *log.borrow(),
            [Op::Rst(true), Op::Dc(false), Op::Backlight(0)]
        );
    }
}
